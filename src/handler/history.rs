//! `history` and `contributors`: read-only repository summaries.

use super::{HandlerEnv, Reply, row};
use crate::diagnostics::EXEC;
use crate::error::Result;

/// Every tag with the number of commits since the previous one
pub(super) async fn history(env: &HandlerEnv) -> Result<Reply> {
    log::info!(target: EXEC, "collecting release history");
    let tags = env.git.list_tags().await?;
    log::debug!(target: EXEC, "found {} tags", tags.len());

    let mut items = Vec::with_capacity(tags.len());
    let mut previous: Option<&str> = None;
    for tag in &tags {
        let commits = env.git.count_commits(previous, tag).await?;
        items.push(row([
            ("version", tag.as_str().into()),
            ("from", previous.unwrap_or_default().into()),
            ("commits", commits.into()),
        ]));
        previous = Some(tag.as_str());
    }
    Ok(Reply::table(items))
}

/// Commit authors, most active first
pub(super) async fn contributors(env: &HandlerEnv) -> Result<Reply> {
    log::info!(target: EXEC, "collecting contributors");
    let contributors = env.git.contributors().await?;
    let items = contributors
        .into_iter()
        .map(|c| row([("author", c.author.into()), ("commits", c.commits.into())]))
        .collect::<Vec<_>>();
    log::debug!(target: EXEC, "found {} contributors", items.len());
    Ok(Reply::table(items))
}
