use chrono::Utc;
use tracing::debug;

use crate::model::board::Board;
use crate::model::comment::Comment;
use crate::model::view::{ViewState, toggle as toggle_membership};
use crate::ops::next_id;

/// Error type for comment operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("comment not found: {}", .0.join("/"))]
    NotFound(Vec<String>),
    #[error("comment text cannot be empty")]
    EmptyText,
    #[error("comment author cannot be empty")]
    EmptyAuthor,
    #[error("no comment ids left for prefix {0}")]
    IdsExhausted(String),
    #[error("cannot reply: maximum thread depth ({0}) reached")]
    MaxDepthReached(usize),
}

/// Post a new top-level comment. Returns the assigned ID.
pub fn add_comment(
    board: &mut Board,
    author: &str,
    text: &str,
    prefix: &str,
) -> Result<String, CommentError> {
    let comment = new_comment(board, author, text, prefix)?;
    let id = comment.id.clone();
    board.comments.push(comment);
    debug!(comment = %id, "added comment");
    Ok(id)
}

/// Reply to the comment at `path` (ids from the top-level comment down).
///
/// `max_depth` counts the top-level comment as level 1, so with the default
/// of 3 a reply to a reply is the deepest allowed.
pub fn post_reply(
    board: &mut Board,
    path: &[&str],
    author: &str,
    text: &str,
    prefix: &str,
    max_depth: usize,
) -> Result<String, CommentError> {
    let reply = new_comment(board, author, text, prefix)?;
    if path.len() + 1 > max_depth {
        // Still resolve the path so an unknown target reports NotFound first.
        find_mut(&mut board.comments, path)?;
        return Err(CommentError::MaxDepthReached(max_depth));
    }
    let parent = find_mut(&mut board.comments, path)?;
    let id = reply.id.clone();
    parent.replies.push(reply);
    debug!(comment = %id, parent = %path.join("/"), "posted reply");
    Ok(id)
}

/// Flip `resolved` on exactly the comment at `path`. Returns the new value.
pub fn toggle_resolved(board: &mut Board, path: &[&str]) -> Result<bool, CommentError> {
    let comment = find_mut(&mut board.comments, path)?;
    comment.resolved = !comment.resolved;
    debug!(comment = %comment.id, resolved = comment.resolved, "toggled resolved");
    Ok(comment.resolved)
}

/// Add one like. Likes are counted, not attributed, so repeats keep adding.
pub fn increment_likes(board: &mut Board, path: &[&str]) -> Result<u32, CommentError> {
    let comment = find_mut(&mut board.comments, path)?;
    comment.likes = comment.likes.saturating_add(1);
    Ok(comment.likes)
}

/// Show or hide the reply box under the comment at `path`. Returns whether it
/// is now open.
pub fn toggle_reply_input(
    board: &Board,
    view: &mut ViewState,
    path: &[&str],
) -> Result<bool, CommentError> {
    let comment = find_comment(board, path)?;
    Ok(toggle_membership(&mut view.reply_inputs, &comment.id))
}

/// Look up the comment at `path`.
pub fn find_comment<'a>(board: &'a Board, path: &[&str]) -> Result<&'a Comment, CommentError> {
    let (first, rest) = path.split_first().ok_or_else(|| not_found(path))?;
    let mut current = board
        .comments
        .iter()
        .find(|c| c.id == *first)
        .ok_or_else(|| not_found(path))?;
    for segment in rest {
        current = current
            .replies
            .iter()
            .find(|c| c.id == *segment)
            .ok_or_else(|| not_found(path))?;
    }
    Ok(current)
}

/// Every comment id in the board, depth-first
pub fn all_comment_ids(board: &Board) -> Vec<&str> {
    fn walk<'a>(comments: &'a [Comment], out: &mut Vec<&'a str>) {
        for c in comments {
            out.push(&c.id);
            walk(&c.replies, out);
        }
    }
    let mut out = Vec::new();
    walk(&board.comments, &mut out);
    out
}

/// Split a `C-001/C-004` style path into segments.
pub fn parse_path(s: &str) -> Vec<&str> {
    s.split('/').map(str::trim).filter(|p| !p.is_empty()).collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_comment(
    board: &Board,
    author: &str,
    text: &str,
    prefix: &str,
) -> Result<Comment, CommentError> {
    let author = author.trim();
    if author.is_empty() {
        return Err(CommentError::EmptyAuthor);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(CommentError::EmptyText);
    }
    let id = next_id(prefix, all_comment_ids(board))
        .ok_or_else(|| CommentError::IdsExhausted(prefix.to_string()))?;
    Ok(Comment::new(id, author.to_string(), text.to_string(), Utc::now()))
}

fn find_mut<'a>(comments: &'a mut [Comment], path: &[&str]) -> Result<&'a mut Comment, CommentError> {
    let (first, rest) = path.split_first().ok_or_else(|| not_found(path))?;
    let mut current = comments
        .iter_mut()
        .find(|c| c.id == *first)
        .ok_or_else(|| not_found(path))?;
    for segment in rest {
        current = current
            .replies
            .iter_mut()
            .find(|c| c.id == *segment)
            .ok_or_else(|| not_found(path))?;
    }
    Ok(current)
}

fn not_found(path: &[&str]) -> CommentError {
    CommentError::NotFound(path.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 3;

    /// C-001 with reply C-002, which has nested reply C-003; and C-004 alone.
    fn sample_board() -> Board {
        let mut board = Board::new("Test");
        add_comment(&mut board, "Dana", "Can we file by Friday?", "C").unwrap();
        post_reply(&mut board, &["C-001"], "Lee", "Only if discovery closes.", "C", MAX).unwrap();
        post_reply(&mut board, &["C-001", "C-002"], "Dana", "It closes Wednesday.", "C", MAX)
            .unwrap();
        add_comment(&mut board, "Sam", "Retainer signed.", "C").unwrap();
        board
    }

    #[test]
    fn structure_of_sample() {
        let board = sample_board();
        assert_eq!(board.comments.len(), 2);
        let top = &board.comments[0];
        assert_eq!(top.replies[0].id, "C-002");
        assert_eq!(top.replies[0].replies[0].id, "C-003");
        assert_eq!(top.height(), 3);
        assert_eq!(board.comments[1].id, "C-004");
    }

    #[test]
    fn reply_starts_clean() {
        let mut board = sample_board();
        let id = post_reply(&mut board, &["C-004"], "Lee", "  Thanks  ", "C", MAX).unwrap();
        let reply = find_comment(&board, &["C-004", id.as_str()]).unwrap();
        assert_eq!(reply.text, "Thanks");
        assert_eq!(reply.likes, 0);
        assert!(!reply.resolved);
        assert!(reply.replies.is_empty());
    }

    #[test]
    fn empty_reply_leaves_forest_unchanged() {
        let mut board = sample_board();
        let before = board.clone();
        assert_eq!(
            post_reply(&mut board, &["C-001"], "Lee", "", "C", MAX),
            Err(CommentError::EmptyText)
        );
        assert_eq!(
            post_reply(&mut board, &["C-001"], "Lee", "  \n\t", "C", MAX),
            Err(CommentError::EmptyText)
        );
        assert_eq!(
            add_comment(&mut board, "Lee", " ", "C"),
            Err(CommentError::EmptyText)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn reply_to_unknown_path() {
        let mut board = sample_board();
        assert_eq!(
            post_reply(&mut board, &["C-001", "C-999"], "Lee", "hi", "C", MAX),
            Err(CommentError::NotFound(vec!["C-001".into(), "C-999".into()]))
        );
        assert!(matches!(
            post_reply(&mut board, &[], "Lee", "hi", "C", MAX),
            Err(CommentError::NotFound(_))
        ));
        // A reply id is not reachable from the wrong parent
        assert!(find_comment(&board, &["C-004", "C-002"]).is_err());
    }

    #[test]
    fn depth_cap_is_enforced() {
        let mut board = sample_board();
        let before = board.clone();
        assert_eq!(
            post_reply(&mut board, &["C-001", "C-002", "C-003"], "Lee", "deeper", "C", MAX),
            Err(CommentError::MaxDepthReached(3))
        );
        assert_eq!(board, before);

        // A larger cap allows it
        post_reply(&mut board, &["C-001", "C-002", "C-003"], "Lee", "deeper", "C", 4).unwrap();
        assert_eq!(board.comments[0].height(), 4);
    }

    #[test]
    fn resolving_a_reply_is_isolated() {
        let mut board = sample_board();
        assert!(toggle_resolved(&mut board, &["C-001", "C-002"]).unwrap());

        assert!(!find_comment(&board, &["C-001"]).unwrap().resolved);
        assert!(find_comment(&board, &["C-001", "C-002"]).unwrap().resolved);
        assert!(!find_comment(&board, &["C-001", "C-002", "C-003"]).unwrap().resolved);

        assert!(!toggle_resolved(&mut board, &["C-001", "C-002"]).unwrap());
    }

    #[test]
    fn resolving_top_comment_leaves_replies() {
        let mut board = sample_board();
        toggle_resolved(&mut board, &["C-001"]).unwrap();
        assert!(!find_comment(&board, &["C-001", "C-002"]).unwrap().resolved);
    }

    #[test]
    fn likes_accumulate_without_dedup() {
        let mut board = sample_board();
        let path = ["C-001", "C-002", "C-003"];
        let original = find_comment(&board, &path).unwrap().likes;
        for _ in 0..3 {
            increment_likes(&mut board, &path).unwrap();
        }
        assert_eq!(find_comment(&board, &path).unwrap().likes, original + 3);
        assert_eq!(find_comment(&board, &["C-001"]).unwrap().likes, 0);
    }

    #[test]
    fn likes_saturate() {
        let mut board = sample_board();
        board.comments[1].likes = u32::MAX;
        assert_eq!(increment_likes(&mut board, &["C-004"]).unwrap(), u32::MAX);
    }

    #[test]
    fn reply_input_is_view_state() {
        let board = sample_board();
        let mut view = ViewState::default();
        assert!(toggle_reply_input(&board, &mut view, &["C-001", "C-002"]).unwrap());
        assert!(view.is_reply_open("C-002"));
        assert!(!view.is_reply_open("C-001"));
        assert!(!toggle_reply_input(&board, &mut view, &["C-001", "C-002"]).unwrap());
        assert!(view.reply_inputs.is_empty());
        assert!(toggle_reply_input(&board, &mut view, &["nope"]).is_err());
    }

    #[test]
    fn ids_are_unique_across_levels() {
        let mut board = sample_board();
        let id = add_comment(&mut board, "Sam", "Next", "C").unwrap();
        assert_eq!(id, "C-005");
        assert_eq!(
            all_comment_ids(&board),
            vec!["C-001", "C-002", "C-003", "C-004", "C-005"]
        );
    }

    #[test]
    fn parse_path_segments() {
        assert_eq!(parse_path("C-001/C-002"), vec!["C-001", "C-002"]);
        assert_eq!(parse_path(" C-001 / "), vec!["C-001"]);
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn blank_author_is_rejected() {
        let mut board = sample_board();
        let before = board.clone();
        assert_eq!(
            add_comment(&mut board, "   ", "hello", "C"),
            Err(CommentError::EmptyAuthor)
        );
        assert_eq!(
            post_reply(&mut board, &["C-004"], "", "hello", "C", MAX),
            Err(CommentError::EmptyAuthor)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn comment_fails_when_ids_run_out() {
        let mut board = sample_board();
        board.comments[1].id = format!("C-{}", usize::MAX);
        let before = board.clone();
        assert!(matches!(
            add_comment(&mut board, "Dana", "One more", "C"),
            Err(CommentError::IdsExhausted(_))
        ));
        assert_eq!(board, before);
    }
}
