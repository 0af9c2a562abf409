use crate::domain::{
    constraint::VersionConstraint,
    entities::ProjectDescriptor,
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_descriptor(descriptor: &ProjectDescriptor) -> Result<(), DomainError> {
        descriptor.validate()
    }

    pub fn validate_constraint(constraint: &str) -> Result<VersionConstraint, DomainError> {
        VersionConstraint::parse(constraint)
    }
}
