//! # unionchat-view
//!
//! Rendering-independent view logic for a chat transcript:
//!
//! - **Scroll anchoring**: resolve symbolic [`ChatPosition`]s against a
//!   [`ContentLayout`] supplied by the renderer
//! - **Autoscroll**: decide whether a new message pulls the viewport down
//! - **Pagination**: single-flight history loads with stale-result guarding
//! - **Presentation**: explicit [`ChatConfig`] and [`StyleTable`], and the
//!   flat [`ChatNode`] list a renderer draws

pub mod anchor;
pub mod autoscroll;
pub mod config;
pub mod layout;
pub mod nodes;
pub mod pagination;
pub mod position;
pub mod style;

mod error;

pub use anchor::{ResolvedScroll, ScrollAnchor};
pub use autoscroll::{AutoscrollTracker, ChatAutoscroll, ScrollRequest};
pub use config::{ChatConfig, Visibility};
pub use error::{ComposeError, PaginationError, ScrollError};
pub use layout::ContentLayout;
pub use nodes::{
    build_nodes, Avatar, ChatBuilder, ChatNode, MessageNode, ReactionBadge, ReplyPreview,
};
pub use pagination::{
    fetch, HistoryLoader, LoadCompletion, LoadTicket, PageOutcome, PageRequest,
    PaginationController, PaginationState,
};
pub use position::{ChatPosition, Edge, UnitPoint};
pub use style::{Alignment, BubbleShape, ChatStyle, Color, ResolvedStyle, StyleTable, TailPosition};
