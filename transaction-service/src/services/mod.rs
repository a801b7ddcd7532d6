pub mod memory;
pub mod metrics;
pub mod repository;
pub mod signature;
pub mod transactions;
pub mod tripay;

pub use memory::InMemoryTransactionStore;
pub use metrics::{get_metrics, init_metrics};
pub use repository::{PaymentRepository, TransactionStore};
pub use transactions::{ErrorKind, TransactionError, TransactionService, TripayCallback};
pub use tripay::{GatewayError, InvoiceGateway, TripayClient};
