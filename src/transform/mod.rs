//! Pure display transforms applied to form inputs: phone and currency masks
//! and the text normalization used by name and login fields.

pub mod money;
pub mod phone;
pub mod text;

pub use money::{apply_money_keystroke, mask_money, parse_money, unmask_money};
pub use phone::{mask_phone, phone_mask_for, unmask_phone, PhoneMask};
pub use text::{contains_uppercase, to_upper, trim};
