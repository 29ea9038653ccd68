pub mod post_merge;
