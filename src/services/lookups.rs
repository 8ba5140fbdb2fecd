use std::collections::{BTreeSet, HashMap};

use crate::{
    errors::AppResult,
    models::dto::response::UserSummary,
    repositories::UserRepository,
};

/// Name and email for each distinct id, fetched in one query.
pub async fn user_summaries<'a, I>(
    users: &dyn UserRepository,
    ids: I,
) -> AppResult<HashMap<String, UserSummary>>
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: Vec<String> = ids
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let found = users.find_by_ids(&unique).await?;
    Ok(found
        .iter()
        .map(|user| (user.id.clone(), UserSummary::from(user)))
        .collect())
}
