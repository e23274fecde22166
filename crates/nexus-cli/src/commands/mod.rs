pub mod diff;
pub mod down;
pub mod init;
pub mod migrate_new;
pub mod reset;
pub mod squash;
pub mod status;
pub mod up;
pub mod validate;
