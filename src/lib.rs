//! Head-unit dashboard engine for server-pushed home-automation sitemaps.
//!
//! This crate is the presentation and navigation layer between a remote
//! home-automation server and a vehicle's template-based display surface.
//! It consumes a live tree of typed widgets (pages, frames, switches,
//! selections, links), decides how each widget presents and whether it is
//! visible, projects pages into flat or sectioned row lists, and turns
//! user interaction back into literal item commands. The host platform
//! renders the resulting [`session::Template`]s and forwards row
//! activations; the connection layer feeds [`feed::FeedEvent`]s in and
//! carries commands out.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Sitemap wire model: widgets, items, states, sitemaps |
//! | [`icon`] | Icon name resolution and state-aware icon URLs |
//! | [`index`] | Per-page widget index with id and parent lookups |
//! | [`visibility`] | Ancestor-aware widget visibility resolution |
//! | [`presentation`] | Widget-to-presentation classification |
//! | [`projection`] | Flat/grouped row projection of a page |
//! | [`page`] | Live state of one navigable page |
//! | [`session`] | Per-display navigation stack and templates |
//! | [`service`] | Multi-session coordination and the update queue |
//! | [`feed`] | Inbound feed events and collaborator traits |
//! | [`error`] | Load failure taxonomy |

pub mod error;
pub mod feed;
pub mod icon;
pub mod index;
pub mod model;
pub mod page;
pub mod presentation;
pub mod projection;
pub mod session;
pub mod service;
pub mod visibility;
