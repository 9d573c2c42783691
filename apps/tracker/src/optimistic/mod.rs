// Optimistic client-state reconciliation.
// Predictions are applied through the board reducer before the remote call
// resolves; failures are undone with a compensating action.

pub mod controller;
pub mod ids;
pub mod operation;
pub mod remote;

pub use controller::{BoardController, ControllerConfig};
pub use ids::{IdGenerator, UuidIdGenerator};
pub use operation::{Confirmation, MutationIntent, OperationId, PendingMutation, Phase};
pub use remote::{InMemoryRemote, RemoteError, RemoteMutations};
