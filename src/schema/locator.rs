// src/schema/locator.rs
// Type Locator - resolves qualified names against the client's schema

use super::{QName, SchemaRegistry, TypeDescriptor, TypeRef, TypeShape};
use crate::client::SoapClient;
use crate::error::{HarnessError, Result};
use moka::sync::Cache;
use std::sync::Arc;
use tracing::debug;

/// Maximum distinct types cached per run
const CACHE_CAPACITY: u64 = 1024;

/// Resolved form of a field or parameter type
#[derive(Debug, Clone)]
pub enum Resolved {
    Scalar(super::ScalarKind),
    Named(Arc<TypeDescriptor>),
}

/// Resolves type names against the schema the client loaded from the WSDL.
///
/// Record descriptors come back flattened: inherited fields first, then the
/// type's own. Results are cached because the schema is immutable for the
/// lifetime of a server instance.
pub struct TypeLocator {
    client: Arc<dyn SoapClient>,
    cache: Cache<QName, Arc<TypeDescriptor>>,
}

impl TypeLocator {
    pub fn new(client: Arc<dyn SoapClient>) -> Self {
        Self {
            client,
            cache: Cache::new(CACHE_CAPACITY),
        }
    }

    fn schema(&self) -> &SchemaRegistry {
        self.client.schema()
    }

    /// Resolve `{namespace}local_name` to a constructible descriptor
    pub fn resolve(&self, namespace: &str, local_name: &str) -> Result<Arc<TypeDescriptor>> {
        self.resolve_qname(&QName::new(namespace, local_name))
    }

    pub fn resolve_qname(&self, name: &QName) -> Result<Arc<TypeDescriptor>> {
        if let Some(hit) = self.cache.get(name) {
            return Ok(hit);
        }

        let declared = self
            .schema()
            .get_type(name)
            .ok_or_else(|| HarnessError::resolution(name, "type is not published by the service"))?;

        let descriptor = match &declared.shape {
            TypeShape::Record { base, .. } => {
                let fields = self.schema().flatten(name).ok_or_else(|| {
                    HarnessError::resolution(name, "extension chain references an unknown base")
                })?;
                TypeDescriptor::record(name.clone(), base.clone(), fields)
            }
            _ => declared.clone(),
        };

        debug!(type_name = %name, fields = descriptor.fields().len(), "Resolved type");
        let descriptor = Arc::new(descriptor);
        self.cache.insert(name.clone(), descriptor.clone());
        Ok(descriptor)
    }

    /// Resolve a field or parameter reference
    pub fn resolve_ref(&self, type_ref: &TypeRef) -> Result<Resolved> {
        match type_ref {
            TypeRef::Builtin(kind) => Ok(Resolved::Scalar(*kind)),
            TypeRef::Named(name) => Ok(Resolved::Named(self.resolve_qname(name)?)),
        }
    }

    /// True when `derived` is `base` or one of its extensions
    pub fn is_derived_from(&self, derived: &QName, base: &QName) -> bool {
        self.schema().is_derived_from(derived, base)
    }

    /// Number of descriptors currently cached
    pub fn cached(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}
