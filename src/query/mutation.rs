//! Write requests and the tags they invalidate.

use super::cache::QueryCache;
use super::tag::Tag;
use crate::api::{Api, ApiError, MutationResponse, Resource};
use serde_json::Value;

/// Specifying the kind of write.
///
#[derive(Clone, Debug, PartialEq)]
pub enum MutationOp {
    Create { payload: Value },
    Update { id: String, payload: Value },
    Delete { id: String },
}

/// A create, update or delete request against one resource.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    pub resource: Resource,
    pub op: MutationOp,
}

impl Mutation {
    pub fn create(resource: Resource, payload: Value) -> Self {
        Mutation {
            resource,
            op: MutationOp::Create { payload },
        }
    }

    pub fn update(resource: Resource, id: &str, payload: Value) -> Self {
        Mutation {
            resource,
            op: MutationOp::Update {
                id: id.to_owned(),
                payload,
            },
        }
    }

    pub fn delete(resource: Resource, id: &str) -> Self {
        Mutation {
            resource,
            op: MutationOp::Delete { id: id.to_owned() },
        }
    }

    /// Tags whose cached queries are stale once this mutation succeeded.
    ///
    pub fn invalidates(&self) -> Vec<Tag> {
        match self.resource {
            // Course titles show up in trainings, tests and orders.
            Resource::Courses => vec![Tag::Courses, Tag::Trainings, Tag::Tests, Tag::Orders],
            Resource::Trainings => vec![Tag::Trainings],
            Resource::Tests => vec![Tag::Tests, Tag::Certificates],
            Resource::Certificates => vec![Tag::Certificates],
            Resource::Users => vec![Tag::Users, Tag::Certificates, Tag::Orders],
            // Companies carry an employee count; employees show their company.
            Resource::Companies => vec![Tag::Companies, Tag::Employees],
            Resource::Employees => vec![Tag::Employees, Tag::Companies],
            Resource::Orders => vec![Tag::Orders],
            Resource::Contacts => vec![Tag::Contacts],
            Resource::Subscribers => vec![Tag::Subscribers],
        }
    }

    /// Short human description, e.g. "Delete course".
    ///
    pub fn describe(&self) -> String {
        let verb = match self.op {
            MutationOp::Create { .. } => "Create",
            MutationOp::Update { .. } => "Update",
            MutationOp::Delete { .. } => "Delete",
        };
        format!("{} {}", verb, self.resource.singular())
    }

    /// Send the mutation and, on success only, invalidate its tags.
    ///
    pub async fn execute(&self, api: &Api, cache: &QueryCache) -> Result<MutationResponse, ApiError> {
        cache.mutate(&self.invalidates(), api.run(self)).await
    }
}
