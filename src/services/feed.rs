//! Feed service implementation
//!
//! Posts, comments and likes. Authors alone may edit or delete what they wrote.

use tracing::info;

use crate::database::DatabaseService;
use crate::models::feed::{Feed, FeedComment, FeedView};
use crate::utils::errors::{BaropotError, Result};

#[derive(Clone)]
pub struct FeedService {
    db: DatabaseService,
}

impl FeedService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i64, content: &str) -> Result<FeedView> {
        let content = required_content(content, "feed")?;
        let feed_id = self.db.feeds.create(user_id, &content).await?;

        info!(feed_id = feed_id, user_id = user_id, "Feed posted");
        self.find_one(feed_id, Some(user_id)).await
    }

    /// Every post, newest first, with comments and likes as seen by the viewer
    pub async fn find_all(&self, viewer_id: Option<i64>) -> Result<Vec<FeedView>> {
        let feeds = self.db.feeds.list().await?;
        self.decorate(feeds, viewer_id).await
    }

    pub async fn find_one(&self, feed_id: i64, viewer_id: Option<i64>) -> Result<FeedView> {
        let feed = self.get(feed_id).await?;
        let mut views = self.decorate(vec![feed], viewer_id).await?;
        views.pop().ok_or_else(|| BaropotError::not_found("Feed", feed_id))
    }

    pub async fn update(&self, user_id: i64, feed_id: i64, content: &str) -> Result<FeedView> {
        let feed = self.get(feed_id).await?;
        ensure_author(feed.user_id, user_id, "feed", feed_id)?;
        let content = required_content(content, "feed")?;

        self.db.feeds.update(feed_id, &content).await?;
        info!(feed_id = feed_id, user_id = user_id, "Feed updated");
        self.find_one(feed_id, Some(user_id)).await
    }

    /// Author-only delete; comments and likes go with the post
    pub async fn delete(&self, user_id: i64, feed_id: i64) -> Result<()> {
        let feed = self.get(feed_id).await?;
        ensure_author(feed.user_id, user_id, "feed", feed_id)?;

        self.db.feeds.delete(feed_id).await?;
        info!(feed_id = feed_id, user_id = user_id, "Feed deleted");
        Ok(())
    }

    pub async fn add_comment(&self, user_id: i64, feed_id: i64, content: &str) -> Result<FeedComment> {
        let content = required_content(content, "comment")?;
        if !self.db.feeds.exists(feed_id).await? {
            return Err(BaropotError::not_found("Feed", feed_id));
        }

        let comment_id = self.db.feeds.create_comment(feed_id, user_id, &content).await?;
        info!(comment_id = comment_id, feed_id = feed_id, user_id = user_id, "Comment added");
        self.get_comment(comment_id).await
    }

    pub async fn update_comment(&self, user_id: i64, comment_id: i64, content: &str) -> Result<FeedComment> {
        let comment = self.get_comment(comment_id).await?;
        ensure_author(comment.user_id, user_id, "comment", comment_id)?;
        let content = required_content(content, "comment")?;

        self.db.feeds.update_comment(comment_id, &content).await?;
        info!(comment_id = comment_id, user_id = user_id, "Comment updated");
        self.get_comment(comment_id).await
    }

    pub async fn delete_comment(&self, user_id: i64, comment_id: i64) -> Result<()> {
        let comment = self.get_comment(comment_id).await?;
        ensure_author(comment.user_id, user_id, "comment", comment_id)?;

        self.db.feeds.delete_comment(comment_id).await?;
        info!(comment_id = comment_id, user_id = user_id, "Comment deleted");
        Ok(())
    }

    /// Like a post; liking twice is a conflict
    pub async fn like(&self, user_id: i64, feed_id: i64) -> Result<FeedView> {
        if !self.db.feeds.exists(feed_id).await? {
            return Err(BaropotError::not_found("Feed", feed_id));
        }
        if !self.db.feeds.insert_like(feed_id, user_id).await? {
            return Err(BaropotError::conflict("feed is already liked"));
        }

        info!(feed_id = feed_id, user_id = user_id, "Feed liked");
        self.find_one(feed_id, Some(user_id)).await
    }

    pub async fn unlike(&self, user_id: i64, feed_id: i64) -> Result<()> {
        if !self.db.feeds.delete_like(feed_id, user_id).await? {
            return Err(BaropotError::not_found("Feed like", feed_id));
        }

        info!(feed_id = feed_id, user_id = user_id, "Feed unliked");
        Ok(())
    }

    async fn get(&self, feed_id: i64) -> Result<Feed> {
        self.db
            .feeds
            .find_by_id(feed_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Feed", feed_id))
    }

    async fn get_comment(&self, comment_id: i64) -> Result<FeedComment> {
        self.db
            .feeds
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Comment", comment_id))
    }

    async fn decorate(&self, feeds: Vec<Feed>, viewer_id: Option<i64>) -> Result<Vec<FeedView>> {
        if feeds.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = feeds.iter().map(|f| f.id).collect();
        let mut comments = self.db.feeds.comments_for(&ids).await?;
        let counts = self.db.feeds.like_counts(&ids).await?;
        let liked = match viewer_id {
            Some(user_id) => self.db.feeds.liked_by(user_id, &ids).await?,
            None => Default::default(),
        };

        Ok(feeds
            .into_iter()
            .map(|feed| {
                let id = feed.id;
                FeedView {
                    comments: comments.remove(&id).unwrap_or_default(),
                    like_count: counts.get(&id).copied().unwrap_or(0),
                    is_liked: liked.contains(&id),
                    feed,
                }
            })
            .collect())
    }
}

/// Trimmed text that must not be blank
fn required_content(content: &str, what: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(BaropotError::validation(format!("{what} content cannot be empty")));
    }
    Ok(content.to_string())
}

fn ensure_author(author_id: i64, user_id: i64, what: &str, id: i64) -> Result<()> {
    if author_id != user_id {
        return Err(BaropotError::forbidden(format!("only the author may modify {what} {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_required_content() {
        assert_eq!(required_content("  first post ", "feed").unwrap(), "first post");

        let err = required_content("   ", "comment").unwrap_err();
        assert_matches!(err, BaropotError::Validation(_));
        assert!(err.to_string().contains("comment content cannot be empty"));
    }

    #[test]
    fn test_ensure_author() {
        assert!(ensure_author(3, 3, "feed", 1).is_ok());
        assert_matches!(ensure_author(3, 4, "comment", 1), Err(BaropotError::Forbidden(_)));
    }
}
