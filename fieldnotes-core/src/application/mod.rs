pub mod catalog;
pub mod lookup;
pub mod service_log;
pub mod sessions;
pub mod unit_of_work;
pub mod users;

pub use catalog::SparePartCatalog;
pub use lookup::MachineLookup;
pub use service_log::ServiceLog;
pub use sessions::{AuthenticatedSession, IssuedSession, SessionService};
pub use unit_of_work::{AppUnitOfWork, AppUnitOfWorkBuilder};
pub use users::UserDirectory;
