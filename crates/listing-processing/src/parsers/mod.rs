//! Field parsers for raw listing values.
//!
//! Every parser is a pure function taking the raw text of one field
//! (`None` when the field is absent or blank) and returning a typed value.
//! Expected malformed input never produces an error: each parser resolves
//! it to a documented default or to an "unavailable" sentinel.
//!
//! | Condition                            | Resolution                  |
//! |--------------------------------------|-----------------------------|
//! | Currency field absent                | `0`                         |
//! | Year field has no 4-digit run        | `None`                      |
//! | Area: both tiers fail                | `f64::NAN`                  |
//! | Certificate lacks affirmative token  | `(false, 0, false)`         |
//! | Parking field absent                 | `1`                         |
//! | Washroom field absent                | `0`                         |

mod area;
mod certificate;
mod numeric;
mod year;

pub use area::{parse_area, parse_dimensions_product, parse_direct_area};
pub use certificate::{AFFIRMATIVE_TOKENS, CertificateInfo, parse_certificate};
pub use numeric::{
    DEFAULT_PARKING, first_integer, parse_currency, parse_parking, sum_plus_separated,
};
pub use year::{extract_all_years, extract_first_year, extract_latest_year};
