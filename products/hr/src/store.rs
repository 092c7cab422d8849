//! Persistence and query facade over the `employees` table.

use entity::employees;
use sea_orm::{
    Condition, ConnectionTrait, DatabaseBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
    sea_query::{Expr, Func, LikeExpr},
};

use crate::import::NewEmployee;

// Keeps each INSERT well below the bind-parameter limits of SQLite and Postgres.
const INSERT_CHUNK_ROWS: usize = 500;
const LIKE_ESCAPE: char = '!';

/// Insert `records` in a single transaction. Nothing is committed unless every
/// row is written.
pub async fn append_batch<C>(db: &C, records: Vec<NewEmployee>) -> Result<u64, DbErr>
where
    C: TransactionTrait,
{
    let models = records
        .into_iter()
        .map(NewEmployee::into_active_model)
        .collect();
    insert_models(db, models).await
}

async fn insert_models<C>(db: &C, models: Vec<employees::ActiveModel>) -> Result<u64, DbErr>
where
    C: TransactionTrait,
{
    if models.is_empty() {
        return Ok(0);
    }
    let count = models.len() as u64;
    let mut models = models.into_iter().peekable();

    let txn = db.begin().await?;
    while models.peek().is_some() {
        let chunk: Vec<_> = models.by_ref().take(INSERT_CHUNK_ROWS).collect();
        employees::Entity::insert_many(chunk).exec(&txn).await?;
    }
    txn.commit().await?;
    Ok(count)
}

/// Records whose name or department contains `term`, ignoring case, ordered by
/// name. A missing or blank term matches everything.
pub async fn search<C>(db: &C, term: Option<&str>) -> Result<Vec<employees::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = employees::Entity::find();
    if let Some(term) = term.filter(|t| !t.trim().is_empty()) {
        let pattern = contains_pattern(&fold_case(db.get_database_backend(), term));
        query = query.filter(
            Condition::any()
                .add(lower(employees::Column::FullName).like(escaped(&pattern)))
                .add(lower(employees::Column::Department).like(escaped(&pattern))),
        );
    }
    query
        .order_by_asc(employees::Column::FullName)
        .order_by_asc(employees::Column::Id)
        .all(db)
        .await
}

/// Total rows stored.
pub async fn count<C>(db: &C) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    employees::Entity::find().count(db).await
}

/// Fold `term` the way the backend's `LOWER()` folds stored values. SQLite
/// only folds ASCII, so non-ASCII letters compare case-sensitively there.
fn fold_case(backend: DatabaseBackend, term: &str) -> String {
    match backend {
        DatabaseBackend::Sqlite => term.to_ascii_lowercase(),
        _ => term.to_lowercase(),
    }
}

fn lower(column: employees::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col((employees::Entity, column))))
}

fn escaped(pattern: &str) -> LikeExpr {
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
