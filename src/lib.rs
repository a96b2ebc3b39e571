pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use datasource::{DataSourceError, FundamentalsSource, MockDataSource, YahooDataSource};
pub use domain::{
    CompanyFundamentals, Consideration, Currency, Decimal, DealStructure, DealType,
    ProFormaResult, RawDealStructure, RawFundamentals, Ticker,
};
pub use engine::{compute_pro_forma, derive_fundamentals, EngineError};
pub use error::AppError;
pub use orchestration::FundamentalsService;
