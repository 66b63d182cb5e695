/*
 * This module provides the application logic layer, centered around
 * `OrganizerLogic` which acts as the Presenter/Controller between the console
 * front end and the core. `OrganizerUiState` holds the per-session UI state.
 * Unit tests for `OrganizerLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod organizer_ui_state;


pub use handler::OrganizerLogic;
pub use organizer_ui_state::OrganizerUiState;
