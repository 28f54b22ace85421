//! Items shared by the capture and calibration modules.

pub mod constants;
