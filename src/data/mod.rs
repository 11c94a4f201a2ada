/// Data layer: raw rows, normalization, domain, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  alias lookup, unit rule → Vec<CanonicalRecord>
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  domain   │  distinct years / collated countries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌───────────┐
///   │  filter   │ ──▶ │ aggregate  │  series, points, KPIs, distributions
///   └──────────┘     └───────────┘
/// ```

pub mod aggregate;
pub mod domain;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
