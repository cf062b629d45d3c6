//! netplan-cfg: per-interface netplan configuration editor
//!
//! A library for editing the netplan document that belongs to a single
//! network interface and applying it with `netplan generate` and
//! `netplan apply`.

pub mod action;
pub mod config;
pub mod document;
pub mod network;
pub mod reconcile;
pub mod store;
