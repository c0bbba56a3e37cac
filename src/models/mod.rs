pub mod contact;
pub mod user;

pub use contact::{BirthdayWindow, Contact, ContactBody, ContactField, Pagination};
pub use user::{
    AvatarUpdate, LoginForm, MessageResponse, RequestEmail, TokenModel, User, UserDb,
    UserResponse, UserSignup,
};
