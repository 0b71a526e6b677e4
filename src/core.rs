pub mod command;
pub mod controller;
pub mod domain;
pub mod events;
pub mod forms;
pub mod library;
pub mod repository;
pub mod validation;
pub mod view;
