//! Mutation resolvers.
//!
//! Every mutation is gated by the configured [`MutationPolicy`]. A denied
//! mutation resolves to `null` without touching the repository.

use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, InputValue, ResolverContext, TypeRef};
use async_graphql::{ErrorExtensions, Value};
use refract_core::{EntitySchema, ID_FIELD};
use refract_storage::DynRepository;
use tracing::{debug, trace, warn};

use super::{graphql_value_to_json, json_to_graphql_value, repository_error_to_graphql, request_context};
use crate::error::GraphQLError;
use crate::policy::{MutationKind, MutationPolicy, MutationRequest, PolicyDecision};

/// Generates the mutation fields for one entity.
pub(crate) fn mutation_fields(
    schema: &EntitySchema,
    repository: &DynRepository,
    policy: &Arc<dyn MutationPolicy>,
    public_type: &str,
    input_type: &str,
) -> Vec<Field> {
    let alias = &schema.alias;
    vec![
        Field::new(
            format!("{alias}Create"),
            TypeRef::named(public_type),
            CreateResolver::resolve(alias.clone(), repository.clone(), policy.clone()),
        )
        .argument(InputValue::new("record", TypeRef::named(input_type)))
        .description(format!("Create a {} record", schema.label())),
        Field::new(
            format!("{alias}Update"),
            TypeRef::named(public_type),
            UpdateResolver::resolve(alias.clone(), repository.clone(), policy.clone()),
        )
        .argument(InputValue::new("record", TypeRef::named(input_type)))
        .description(format!("Update a {} record by its _id", schema.label())),
        Field::new(
            format!("{alias}RemoveById"),
            TypeRef::named(TypeRef::BOOLEAN),
            RemoveByIdResolver::resolve(alias.clone(), repository.clone(), policy.clone()),
        )
        .argument(InputValue::new("id", TypeRef::named(TypeRef::STRING)))
        .description(format!("Remove a {} record by ID", schema.label())),
    ]
}

/// Runs the policy check, logging the reason on denial.
fn authorize(
    ctx: &ResolverContext<'_>,
    policy: &dyn MutationPolicy,
    kind: MutationKind,
    entity: &str,
    record_id: Option<&str>,
) -> bool {
    let request = MutationRequest {
        kind,
        entity,
        record_id,
        context: request_context(ctx),
    };
    match policy.check(&request) {
        PolicyDecision::Allow => true,
        PolicyDecision::Deny { reason } => {
            debug!(entity = %entity, kind = %kind, reason = %reason, "Mutation denied");
            false
        }
    }
}

/// The `record` argument as JSON.
///
/// An `ID` may arrive as an Int literal; `_id` is always passed on as a string.
fn record_arg(ctx: &ResolverContext<'_>) -> Result<serde_json::Value, async_graphql::Error> {
    let record = ctx
        .args
        .get("record")
        .filter(|value| !value.is_null())
        .ok_or_else(|| GraphQLError::invalid_argument("missing required argument 'record'").extend())?;

    let mut record = graphql_value_to_json(record.as_value());
    if let Some(id) = record.get_mut(ID_FIELD)
        && let serde_json::Value::Number(number) = id
    {
        let text = number.to_string();
        *id = serde_json::Value::String(text);
    }
    Ok(record)
}

/// Resolver for `{alias}Create`.
///
/// ```graphql
/// mutation {
///   productCreate(record: {name: "Chair", price: 49.99}) { _id name price }
/// }
/// ```
pub struct CreateResolver;

impl CreateResolver {
    pub fn resolve(
        alias: String,
        repository: DynRepository,
        policy: Arc<dyn MutationPolicy>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let alias = alias.clone();
            let repository = repository.clone();
            let policy = policy.clone();

            FieldFuture::new(async move {
                debug!(alias = %alias, "Processing create mutation");

                if !authorize(&ctx, policy.as_ref(), MutationKind::Create, &alias, None) {
                    return Ok(None);
                }

                let record = record_arg(&ctx)?;
                trace!(alias = %alias, "Creating record via repository");

                let created = repository.create(&record).await.map_err(|e| {
                    warn!(error = %e, alias = %alias, "Create failed");
                    repository_error_to_graphql(e)
                })?;

                debug!(
                    alias = %alias,
                    id = created.get(ID_FIELD).and_then(|v| v.as_str()).unwrap_or_default(),
                    "Record created"
                );
                Ok(Some(json_to_graphql_value(created)))
            })
        }
    }
}

/// Resolver for `{alias}Update`.
///
/// The record is addressed by `record._id`. Supplied fields replace stored
/// ones, all others are kept. Resolves to the updated record, or `null` when
/// no record has that id. The policy is consulted before arguments are
/// checked, so a denied caller never sees argument errors.
pub struct UpdateResolver;

impl UpdateResolver {
    pub fn resolve(
        alias: String,
        repository: DynRepository,
        policy: Arc<dyn MutationPolicy>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let alias = alias.clone();
            let repository = repository.clone();
            let policy = policy.clone();

            FieldFuture::new(async move {
                let record = record_arg(&ctx);
                let id = record
                    .as_ref()
                    .ok()
                    .and_then(|r| r.get(ID_FIELD))
                    .and_then(|v| v.as_str())
                    .map(str::to_owned);

                if !authorize(&ctx, policy.as_ref(), MutationKind::Update, &alias, id.as_deref()) {
                    return Ok(None);
                }

                let record = record?;
                let Some(id) = id.as_deref() else {
                    debug!(alias = %alias, "Update without _id ignored");
                    return Ok(None);
                };
                debug!(alias = %alias, id = %id, "Processing update mutation");

                let updated = repository.update(id, &record).await.map_err(|e| {
                    warn!(error = %e, alias = %alias, id = %id, "Update failed");
                    repository_error_to_graphql(e)
                })?;

                if updated.is_none() {
                    debug!(alias = %alias, id = %id, "Update target not found");
                }
                Ok(updated.map(json_to_graphql_value))
            })
        }
    }
}

/// Resolver for `{alias}RemoveById`.
///
/// Resolves to `true` once the record is gone, whether or not it existed.
pub struct RemoveByIdResolver;

impl RemoveByIdResolver {
    pub fn resolve(
        alias: String,
        repository: DynRepository,
        policy: Arc<dyn MutationPolicy>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let alias = alias.clone();
            let repository = repository.clone();
            let policy = policy.clone();

            FieldFuture::new(async move {
                let id = ctx.args.get("id").and_then(|v| v.string().ok());

                if !authorize(&ctx, policy.as_ref(), MutationKind::Remove, &alias, id) {
                    return Ok(None);
                }

                let id = id.ok_or_else(|| {
                    GraphQLError::invalid_argument("missing required argument 'id'").extend()
                })?;
                debug!(alias = %alias, id = %id, "Processing remove mutation");

                let existed = repository.delete_by_id(id).await.map_err(|e| {
                    warn!(error = %e, alias = %alias, id = %id, "Remove failed");
                    repository_error_to_graphql(e)
                })?;

                debug!(alias = %alias, id = %id, existed, "Record removed");
                Ok(Some(Value::Boolean(true)))
            })
        }
    }
}
