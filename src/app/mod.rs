//! Application layer: the wallet connection manager and its collaborators.

pub mod controller;
pub mod events;
pub mod resolve;
pub mod session;
pub mod view;

pub use controller::{FlowConfig, Session, TipController, detect_wallet};
pub use events::EventSubscription;
pub use resolve::resolve_recipient;
pub use session::{PendingTransaction, ProviderHandle, SignerHandle, query_chain_id};
pub use view::WidgetView;
