//! # Optimizer Module
//!
//! Pipeline di un batch, separata in sottomoduli:
//! - `media_optimizer`: Orchestratore principale
//! - `task_optimizer`: Worker per singoli file
//! - `progress_tracker`: Stato del batch e conteggi
//! - `path_resolver`: Path di output e ricerca degli artifact
//! - `workspace`: Directory di lavoro con rimozione garantita

pub mod media_optimizer;
pub mod path_resolver;
pub mod progress_tracker;
pub mod task_optimizer;
pub mod workspace;

pub use media_optimizer::MediaOptimizer;
pub use path_resolver::{PathResolver, ResolvedArtifact};
pub use progress_tracker::{BatchState, ProgressTracker};
pub use task_optimizer::TaskOptimizer;
pub use workspace::Workspace;
