// SPDX-License-Identifier: MIT

pub mod opptak;
pub mod store;
