pub mod choicelist;
pub mod codec;
pub mod color;
pub mod container;
pub mod context;
pub mod dialog;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod factory;
pub mod id;
pub mod lint;
pub mod model;
pub mod naming;
pub mod registry;
pub mod selection;

pub use choicelist::{ChoiceListState, Order, Row, sample_state};
pub use container::{ContainerItem, ContainerState, ItemState, SelectionMode};
pub use context::{ChangeNotification, Context, Notice, NoticeLevel, NoticeSink};
pub use dialog::Dialog;
pub use dispatch::{
    DispatchConfig, DisplayPolicy, Presentation, RejectReason, Rejection, Resolution,
};
pub use document::{DialogDocument, ElementRecord};
pub use error::{DocumentError, FactoryError, GroupError, StateError, UpdateError};
pub use factory::ElementSpec;
pub use id::ElementId;
pub use lint::{LintDiagnostic, LintSeverity, lint_dialog};
pub use model::*;
pub use registry::{Arrange, Registry};
