pub mod admin;
pub mod application;
pub mod comment;
pub mod gallery;
pub mod job;
pub mod media;
pub mod post;

pub use admin::Admin;
pub use application::Application;
pub use comment::Comment;
pub use gallery::GalleryItem;
pub use job::Job;
pub use media::Media;
pub use post::Post;
