pub mod initialize_policy;
pub use initialize_policy::*;

pub mod distribute_fees;
pub use distribute_fees::*;

pub mod sweep_dust;
pub use sweep_dust::*;

pub mod recover_foreign_fees;
pub use recover_foreign_fees::*;
