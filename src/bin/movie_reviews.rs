//! Reviews a few movies, then prints the tree after each step.
//!
//! Set `RUST_LOG` to change what is logged; by default the map's rebalancing
//! steps are shown at `TRACE` level.

use ods_btree::BTreeMap;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type Reviews = BTreeMap<String, String, 2>;

fn log_layers(reviews: &Reviews) {
    for (depth, layer) in reviews.traverse_breadth_first().iter().enumerate() {
        let nodes: Vec<Vec<&str>> =
            layer.iter().map(|node| node.iter().map(|(title, _)| title.as_str()).collect()).collect();
        info!(depth, ?nodes, "layer");
    }
}

fn look_up(reviews: &Reviews, title: &str) {
    match reviews.find(&title.to_string()) {
        Some(review) => info!("{title}: {review}"),
        None => info!("{title} is unreviewed."),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_reviews=info,ods_btree=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut movie_reviews = Reviews::new();

    // review some movies.
    for (title, review) in [
        ("Office Space", "Deals with real issues in the workplace."),
        ("Pulp Fiction", "Masterpiece."),
        ("The Godfather", "Very enjoyable."),
        ("The Blues Brothers", "Eye lyked it a lot."),
    ] {
        if let Err(err) = movie_reviews.try_insert(title.to_string(), review.to_string()) {
            info!(title = err.key().as_str(), "{err}");
        }
    }
    log_layers(&movie_reviews);

    // check for a specific one.
    look_up(&movie_reviews, "Les Misérables");

    // oops, this review has a lot of spelling mistakes, let's delete it.
    if let Some(review) = movie_reviews.erase(&"The Blues Brothers".to_string()) {
        info!("Removed \"The Blues Brothers\" ({review:?}).");
    }
    log_layers(&movie_reviews);

    // look up the values associated with some keys.
    for title in ["Up!", "Office Space"] {
        look_up(&movie_reviews, title);
    }

    info!(count = movie_reviews.len(), height = movie_reviews.height(), "done");
}
