//! Query resolvers.
//!
//! For an entity `product` the query root gains:
//!
//! ```graphql
//! productCount(filter: productEntityFilter): Int
//! productEntityFindById(id: String): productEntity
//! productList(filter: productEntityFilter, sort: productEntitySort, skip: Int, limit: Int): [product]
//! productEntityList(filter: productEntityFilter, sort: productEntitySort, skip: Int, limit: Int): [productEntity]
//! productFindById(id: String): product
//! ```
//!
//! Entities flagged `max_one` get a singleton `product: product` accessor
//! instead of `productFindById`.

use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, InputValue, ResolverContext, TypeRef};
use async_graphql::{ErrorExtensions, Value};
use refract_core::EntitySchema;
use refract_storage::{DynRepository, Filter};
use tracing::{debug, warn};

use super::{json_to_graphql_value, repository_error_to_graphql};
use crate::schema::{FieldKinds, parse_filter_arg, parse_find_query};

/// Type names an entity's query fields refer to.
#[derive(Debug, Clone)]
pub(crate) struct QueryTypes {
    pub public: String,
    pub entity: String,
    pub filter: String,
    pub sort: String,
}

/// Generates the query fields for one entity.
pub(crate) fn query_fields(
    schema: &EntitySchema,
    repository: &DynRepository,
    types: &QueryTypes,
    max_list_limit: Option<u64>,
) -> Vec<Field> {
    let alias = &schema.alias;
    let kinds = Arc::new(FieldKinds::of(schema));
    let list_args = |field: Field| {
        field
            .argument(InputValue::new("filter", TypeRef::named(&types.filter)))
            .argument(InputValue::new("sort", TypeRef::named(&types.sort)))
            .argument(InputValue::new("skip", TypeRef::named(TypeRef::INT)))
            .argument(InputValue::new("limit", TypeRef::named(TypeRef::INT)))
    };

    let mut fields = vec![
        Field::new(
            format!("{alias}Count"),
            TypeRef::named(TypeRef::INT),
            CountResolver::resolve(alias.clone(), repository.clone(), kinds.clone()),
        )
        .argument(InputValue::new("filter", TypeRef::named(&types.filter)))
        .description(format!("Count {} records", schema.label())),
        Field::new(
            format!("{alias}EntityFindById"),
            TypeRef::named(&types.entity),
            FindByIdResolver::resolve(alias.clone(), repository.clone()),
        )
        .argument(InputValue::new("id", TypeRef::named(TypeRef::STRING)))
        .description(format!("Read a persisted {} record by ID", schema.label())),
        list_args(Field::new(
            format!("{alias}List"),
            TypeRef::named_list(&types.public),
            ListResolver::resolve(alias.clone(), repository.clone(), kinds.clone(), max_list_limit),
        ))
        .description(format!("List {} records", schema.label())),
        list_args(Field::new(
            format!("{alias}EntityList"),
            TypeRef::named_list(&types.entity),
            ListResolver::resolve(alias.clone(), repository.clone(), kinds, max_list_limit),
        ))
        .description(format!("List persisted {} records", schema.label())),
    ];

    if schema.max_one {
        fields.push(
            Field::new(
                alias.as_str(),
                TypeRef::named(&types.public),
                SingletonResolver::resolve(alias.clone(), repository.clone()),
            )
            .description(format!("The {} record", schema.label())),
        );
    } else {
        fields.push(
            Field::new(
                format!("{alias}FindById"),
                TypeRef::named(&types.public),
                FindByIdResolver::resolve(alias.clone(), repository.clone()),
            )
            .argument(InputValue::new("id", TypeRef::named(TypeRef::STRING)))
            .description(format!("Read a single {} record by ID", schema.label())),
        );
    }

    fields
}

/// Resolver for `{alias}Count`.
pub struct CountResolver;

impl CountResolver {
    pub fn resolve(
        alias: String,
        repository: DynRepository,
        kinds: Arc<FieldKinds>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let alias = alias.clone();
            let repository = repository.clone();
            let kinds = kinds.clone();
            FieldFuture::new(async move {
                let filter = parse_filter_arg(&ctx.args, &kinds).map_err(|e| e.extend())?;
                let count = repository.count(&filter).await.map_err(|e| {
                    warn!(error = %e, alias = %alias, "Count failed");
                    repository_error_to_graphql(e)
                })?;

                debug!(alias = %alias, count, "Resolved count");
                Ok(Some(Value::Number(count.into())))
            })
        }
    }
}

/// Resolver for `{alias}FindById` and `{alias}EntityFindById`.
pub struct FindByIdResolver;

impl FindByIdResolver {
    pub fn resolve(
        alias: String,
        repository: DynRepository,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let alias = alias.clone();
            let repository = repository.clone();
            FieldFuture::new(async move {
                let Some(id) = ctx.args.get("id").and_then(|v| v.string().ok()) else {
                    return Ok(None);
                };

                debug!(alias = %alias, id = %id, "Resolving record by id");
                let record = repository.find_by_id(id).await.map_err(|e| {
                    warn!(error = %e, alias = %alias, "Repository error reading record");
                    repository_error_to_graphql(e)
                })?;

                Ok(record.map(json_to_graphql_value))
            })
        }
    }
}

/// Resolver for `{alias}List` and `{alias}EntityList`.
pub struct ListResolver;

impl ListResolver {
    pub fn resolve(
        alias: String,
        repository: DynRepository,
        kinds: Arc<FieldKinds>,
        max_list_limit: Option<u64>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let alias = alias.clone();
            let repository = repository.clone();
            let kinds = kinds.clone();
            FieldFuture::new(async move {
                let query =
                    parse_find_query(&ctx.args, &kinds, max_list_limit).map_err(|e| e.extend())?;

                let records = repository.find(&query).await.map_err(|e| {
                    warn!(error = %e, alias = %alias, "List failed");
                    repository_error_to_graphql(e)
                })?;

                debug!(
                    alias = %alias,
                    count = records.len(),
                    skip = ?query.skip,
                    limit = ?query.limit,
                    "Resolved list"
                );
                Ok(Some(Value::List(
                    records.into_iter().map(json_to_graphql_value).collect(),
                )))
            })
        }
    }
}

/// Resolver for the `{alias}` accessor of `max_one` entities.
pub struct SingletonResolver;

impl SingletonResolver {
    pub fn resolve(
        alias: String,
        repository: DynRepository,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |_ctx| {
            let alias = alias.clone();
            let repository = repository.clone();
            FieldFuture::new(async move {
                let record = repository.find_one(&Filter::All).await.map_err(|e| {
                    warn!(error = %e, alias = %alias, "Repository error reading singleton");
                    repository_error_to_graphql(e)
                })?;

                if record.is_none() {
                    debug!(alias = %alias, "Singleton record not created yet");
                }
                Ok(record.map(json_to_graphql_value))
            })
        }
    }
}
