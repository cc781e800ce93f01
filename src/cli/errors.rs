use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{given} needs {missing} as well")]
    IncompleteArgumentPair {
        given: &'static str,
        missing: &'static str,
    },

    #[error("Nothing to do: pass --output to write results or --info for a summary")]
    NothingToDo,

    #[error(transparent)]
    Grid(#[from] radgrid::Error),
}
