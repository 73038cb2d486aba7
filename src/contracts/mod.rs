pub mod call;
pub mod client;
pub mod layout;
pub mod mock;
pub mod package;
pub mod types;

pub use call::{CallArg, EntryFunction, MoveCall, CLOCK_OBJECT_ID};
pub use client::{SuiCliClient, SuiClientConfig, TransactionClient, WorkingContext};
pub use layout::ContractLayout;
pub use mock::{MockTransactionClient, RecordedCall};
pub use package::publish_package;
pub use types::{ObjectChange, TransactionReceipt};
