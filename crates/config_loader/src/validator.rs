//! Config validation module
//!
//! Validation rules:
//! - tag_field non-empty
//! - known_types non-empty, entries unique and non-empty
//! - delivery_size > 0
//! - max_batch_bytes > 0, submit_timeout_ms > 0
//! - transport / deadletter names non-empty
//! - kind-required params present (replay path, udp addr, file path)

use std::collections::HashSet;

use contracts::{
    ContractError, DeadletterKind, RelayBlueprint, SourceKind, TransportKind,
};

/// Validate a RelayBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_feed(blueprint)?;
    validate_source(blueprint)?;
    validate_transport(blueprint)?;
    validate_deadletter(blueprint)?;
    Ok(())
}

/// Validate feed settings
fn validate_feed(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let feed = &blueprint.feed;

    if feed.tag_field.is_empty() {
        return Err(ContractError::config_validation(
            "feed.tag_field",
            "tag_field cannot be empty",
        ));
    }

    if feed.known_types.is_empty() {
        return Err(ContractError::config_validation(
            "feed.known_types",
            "at least one known type is required",
        ));
    }

    let mut seen = HashSet::new();
    for known_type in &feed.known_types {
        if known_type.is_empty() {
            return Err(ContractError::config_validation(
                "feed.known_types",
                "known type name cannot be empty",
            ));
        }
        if !seen.insert(known_type) {
            return Err(ContractError::config_validation(
                format!("feed.known_types[{known_type}]"),
                "duplicate known type",
            ));
        }
    }

    Ok(())
}

/// Validate source configuration
fn validate_source(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;

    if source.delivery_size == 0 {
        return Err(ContractError::config_validation(
            "source.delivery_size",
            "delivery_size must be > 0",
        ));
    }

    if source.kind == SourceKind::Replay && !source.params.contains_key("path") {
        return Err(ContractError::config_validation(
            "source.params.path",
            "replay source requires a 'path' parameter",
        ));
    }

    if let Some(ratio) = source.params.get("unknown_ratio") {
        let parsed: f64 = ratio.parse().map_err(|_| {
            ContractError::config_validation(
                "source.params.unknown_ratio",
                format!("not a number: '{ratio}'"),
            )
        })?;
        if !(0.0..=1.0).contains(&parsed) {
            return Err(ContractError::config_validation(
                "source.params.unknown_ratio",
                format!("must be within [0, 1], got {parsed}"),
            ));
        }
    }

    Ok(())
}

/// Validate transport configuration
fn validate_transport(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let transport = &blueprint.transport;

    if transport.name.is_empty() {
        return Err(ContractError::config_validation(
            "transport.name",
            "transport name cannot be empty",
        ));
    }

    if transport.max_batch_bytes == 0 {
        return Err(ContractError::config_validation(
            "transport.max_batch_bytes",
            "max_batch_bytes must be > 0",
        ));
    }

    if transport.submit_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "transport.submit_timeout_ms",
            "submit_timeout_ms must be > 0",
        ));
    }

    match transport.kind {
        TransportKind::Udp if !transport.params.contains_key("addr") => {
            Err(ContractError::config_validation(
                "transport.params.addr",
                "udp transport requires an 'addr' parameter",
            ))
        }
        TransportKind::File if !transport.params.contains_key("path") => {
            Err(ContractError::config_validation(
                "transport.params.path",
                "file transport requires a 'path' parameter",
            ))
        }
        _ => Ok(()),
    }
}

/// Validate dead-letter configuration
fn validate_deadletter(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let deadletter = &blueprint.deadletter;

    if deadletter.name.is_empty() {
        return Err(ContractError::config_validation(
            "deadletter.name",
            "deadletter name cannot be empty",
        ));
    }

    if deadletter.kind == DeadletterKind::File && !deadletter.params.contains_key("path") {
        return Err(ContractError::config_validation(
            "deadletter.params.path",
            "file deadletter requires a 'path' parameter",
        ));
    }

    Ok(())
}
