//! Symmetric ciphers outside the JOSE envelope

pub mod legacy;
