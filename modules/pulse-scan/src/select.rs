//! Diversity- and recency-constrained selection.
//!
//! Pass one admits candidates in rank order while the per-author and
//! zero-reply caps allow. Recent candidates turned away by any cap are
//! deferred. Pass two works through the deferred list newest first, filling
//! free capacity and then replacing the lowest-ranked non-recent admissions
//! until the recency quota is met. Caps hold in both passes.

use std::collections::HashMap;

use arctic_client::Post;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::policy::ScanPolicy;
use crate::rank::rank_order;

/// One admitted candidate. `candidate` indexes the input slice.
#[derive(Debug, Clone, Copy)]
struct Slot {
    candidate: usize,
    rank: f64,
    recent: bool,
}

/// Running per-author and zero-reply counts for the admitted set.
struct Caps<'a> {
    per_author: HashMap<&'a str, usize>,
    zero_reply: usize,
    max_per_author: usize,
    max_zero_reply: usize,
}

impl<'a> Caps<'a> {
    fn new(policy: &ScanPolicy) -> Self {
        Self {
            per_author: HashMap::new(),
            zero_reply: 0,
            max_per_author: policy.max_posts_per_author,
            max_zero_reply: policy.max_zero_reply_posts,
        }
    }

    fn author_count(&self, post: &Post) -> usize {
        self.per_author.get(post.author.as_str()).copied().unwrap_or(0)
    }

    fn admits(&self, post: &Post) -> bool {
        self.admits_replacing(post, None)
    }

    /// Whether `post` fits once `outgoing` (if any) has left the set.
    fn admits_replacing(&self, post: &Post, outgoing: Option<&Post>) -> bool {
        let freed_author = outgoing.is_some_and(|o| o.author == post.author) as usize;
        if self.author_count(post) - freed_author >= self.max_per_author {
            return false;
        }
        if post.num_comments == 0 {
            let freed_zero = outgoing.is_some_and(|o| o.num_comments == 0) as usize;
            if self.zero_reply - freed_zero >= self.max_zero_reply {
                return false;
            }
        }
        true
    }

    fn add(&mut self, post: &'a Post) {
        *self.per_author.entry(post.author.as_str()).or_insert(0) += 1;
        if post.num_comments == 0 {
            self.zero_reply += 1;
        }
    }

    fn remove(&mut self, post: &'a Post) {
        if let Some(count) = self.per_author.get_mut(post.author.as_str()) {
            *count = count.saturating_sub(1);
        }
        if post.num_comments == 0 {
            self.zero_reply = self.zero_reply.saturating_sub(1);
        }
    }
}

/// Select at most `policy.max_posts` posts honouring the author and zero-reply
/// caps, then top up recent posts (newer than `now - policy.recent_window`)
/// towards `policy.min_recent_posts` on a best-effort basis.
pub fn select_diverse(posts: Vec<Post>, now: DateTime<Utc>, policy: &ScanPolicy) -> Vec<Post> {
    let boundary = (now - policy.recent_window).timestamp();
    let is_recent = |post: &Post| post.created_utc > boundary;

    let mut caps = Caps::new(policy);
    let mut selected: Vec<Slot> = Vec::with_capacity(policy.max_posts.min(posts.len()));
    let mut deferred: Vec<usize> = Vec::new();
    let mut recent_count = 0;

    for (idx, rank) in rank_order(&posts) {
        let post = &posts[idx];
        let recent = is_recent(post);
        if selected.len() >= policy.max_posts || !caps.admits(post) {
            if recent {
                deferred.push(idx);
            }
            continue;
        }
        caps.add(post);
        selected.push(Slot {
            candidate: idx,
            rank,
            recent,
        });
        if recent {
            recent_count += 1;
        }
    }

    if recent_count < policy.min_recent_posts && !deferred.is_empty() {
        deferred.sort_by(|&a, &b| posts[b].created_utc.cmp(&posts[a].created_utc));
        let ranks: HashMap<usize, f64> = rank_order(&posts).into_iter().collect();

        for idx in deferred {
            if recent_count >= policy.min_recent_posts {
                break;
            }
            let post = &posts[idx];
            let incoming = Slot {
                candidate: idx,
                rank: ranks.get(&idx).copied().unwrap_or(0.0),
                recent: true,
            };

            if selected.len() < policy.max_posts {
                if caps.admits(post) {
                    caps.add(post);
                    selected.push(incoming);
                    recent_count += 1;
                }
                continue;
            }

            if !selected.iter().any(|s| !s.recent) {
                break;
            }
            // Lowest rank wins; among equal ranks, the later position.
            let victim = selected
                .iter()
                .enumerate()
                .rev()
                .filter(|(_, s)| !s.recent)
                .filter(|(_, s)| caps.admits_replacing(post, Some(&posts[s.candidate])))
                .min_by(|(_, a), (_, b)| a.rank.total_cmp(&b.rank))
                .map(|(i, _)| i);

            if let Some(i) = victim {
                let outgoing = &posts[selected[i].candidate];
                debug!(incoming = %post.id, outgoing = %outgoing.id, "Replacing non-recent post to meet recency quota");
                caps.remove(outgoing);
                caps.add(post);
                selected[i] = incoming;
                recent_count += 1;
            }
        }
    }

    let mut pool: Vec<Option<Post>> = posts.into_iter().map(Some).collect();
    selected
        .into_iter()
        .filter_map(|slot| pool[slot.candidate].take())
        .collect()
}
