/// Asserts the number of live cells in the world.
#[macro_export]
macro_rules! assert_population {
    ($world:expr, $count:expr) => {
        assert_eq!(
            $world.cells.iter().filter(|c| !c.expired).count(),
            $count,
            "Population count mismatch"
        );
    };
}

/// Asserts that a cell with the given id is no longer in the world.
#[macro_export]
macro_rules! assert_cell_gone {
    ($world:expr, $id:expr) => {
        assert!(
            $world.cell($id).is_none(),
            "Cell {} should be gone but was found",
            $id
        );
    };
}

/// Asserts the number of genomes waiting in the unborn cache.
#[macro_export]
macro_rules! assert_unborn {
    ($world:expr, $count:expr) => {
        assert_eq!(
            $world.population.unborn().len(),
            $count,
            "Unborn cache size mismatch"
        );
    };
}
