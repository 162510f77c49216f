// Services layer for the collaborators around the session engine
// Services own validation and notifications, calling the core store traits

pub mod feedback;
pub mod friend;
pub mod user;

pub use feedback::FeedbackService;
pub use friend::FriendService;
pub use user::UserService;
