//! Configuration and settings for the usage analyzer.

mod settings;

pub use settings::{
    expand_home,
    AnalyzerConfig,
    RecordFilter,
    TimeWindow,
    DEFAULT_DB_PATH,
    DEFAULT_ENDPOINT_HOST,
    DEFAULT_EXCLUDED_MODEL,
    DISPLAY_TIMEZONE,
    POINTS_PER_REQUEST,
    RATE_LIMIT_STATUS_HEADER,
    TOKENS_PER_POINT,
};
