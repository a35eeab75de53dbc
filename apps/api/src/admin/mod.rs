// Admin Console: session context, job editor orchestration, and the admin routes.

pub mod console;
pub mod handlers;
pub mod session;

pub use console::{AdminConsole, Confirmation};
pub use session::{AdminSession, AuthProvider, HostedAuth};
