//! Prints a random flat comment dump for one post, in the backend's JSON format.
//!
//! Usage: `generate-test-data [NUM_COMMENTS] [SEED]`

use agora_api::{Author, Comment, CommentId, Reaction, UserId};
use chrono::{Duration, TimeZone, Utc};
use rand::{seq::SliceRandom, Rng, SeedableRng};

const NUM_USERS: usize = 8;
const DEFAULT_NUM_COMMENTS: usize = 60;

/// Probability for a comment to start a new thread instead of replying
const ROOT_PROBABILITY: f64 = 0.2;

/// Replies mostly go to one of the last few comments, which makes for deep chains
const REPLY_WINDOW: usize = 4;

const MAX_REACTIONS: u32 = 12;
const COMMENT_WORD_COUNT: usize = 25;

fn gen_author(rng: &mut impl Rng, i: usize) -> Author {
    Author {
        id: UserId(format!("user-{i}")),
        display_name: lipsum::lipsum_title_with_rng(&mut *rng),
        avatar: None,
        reputation_points: rng.gen_range(0..500),
    }
}

fn gen_reaction(rng: &mut impl Rng) -> Reaction {
    match rng.gen_range(0..4) {
        0 => Reaction::Positive,
        1 => Reaction::Negative,
        _ => Reaction::None,
    }
}

fn main() -> Result<(), serde_json::Error> {
    let mut args = std::env::args().skip(1);
    let num_comments = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_NUM_COMMENTS);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random);
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let authors = (0..NUM_USERS)
        .map(|i| gen_author(&mut rng, i))
        .collect::<Vec<_>>();
    let start = Utc
        .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default();

    let mut comments: Vec<Comment> = Vec::with_capacity(num_comments);
    let mut time = start;
    for i in 0..num_comments {
        time += Duration::seconds(rng.gen_range(1..3600));
        let parent = match i == 0 || rng.gen_bool(ROOT_PROBABILITY) {
            true => None,
            false => Some(comments[rng.gen_range(i.saturating_sub(REPLY_WINDOW)..i)].id.clone()),
        };
        let viewer = gen_reaction(&mut rng);
        let (is_positive_reacted, is_negative_reacted) = viewer.to_flags();
        comments.push(Comment {
            id: CommentId(format!("c{i}")),
            content: lipsum::lipsum_words_with_rng(&mut rng, COMMENT_WORD_COUNT),
            author: authors[rng.gen_range(0..authors.len())].clone(),
            created_at: time,
            parent_comment_id: parent,
            positive_reaction_count: rng.gen_range(0..MAX_REACTIONS)
                + u32::from(viewer == Reaction::Positive),
            negative_reaction_count: rng.gen_range(0..MAX_REACTIONS)
                + u32::from(viewer == Reaction::Negative),
            is_positive_reacted,
            is_negative_reacted,
            material_ids: Vec::new(),
        });
    }

    // The backend does not list comments in any particular order
    comments.shuffle(&mut rng);
    println!("{}", serde_json::to_string_pretty(&comments)?);
    Ok(())
}
