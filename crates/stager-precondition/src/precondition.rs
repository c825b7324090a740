//! The precondition tree

use std::fmt;

use stager_translation::{Error, Result, TranslatableMessage};

use crate::check::{Check, CheckContext, Outcome};

/// A node in a precondition tree.
pub enum Precondition {
    Leaf(Box<dyn Check>),
    Composite(Composite),
}

/// An ordered group of preconditions, fulfilled when every child is.
pub struct Composite {
    name: &'static str,
    description: TranslatableMessage,
    fulfilled_message: TranslatableMessage,
    children: Vec<Precondition>,
}

impl Composite {
    pub fn new(
        name: &'static str,
        description: TranslatableMessage,
        fulfilled_message: TranslatableMessage,
        children: Vec<Precondition>,
    ) -> Self {
        Self {
            name,
            description,
            fulfilled_message,
            children,
        }
    }
}

impl Precondition {
    pub fn leaf(check: impl Check + 'static) -> Self {
        Self::Leaf(Box::new(check))
    }

    pub fn composite(
        name: &'static str,
        description: TranslatableMessage,
        fulfilled_message: TranslatableMessage,
        children: Vec<Precondition>,
    ) -> Self {
        Self::Composite(Composite::new(name, description, fulfilled_message, children))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Leaf(check) => check.name(),
            Self::Composite(c) => c.name,
        }
    }

    pub fn description(&self) -> TranslatableMessage {
        match self {
            Self::Leaf(check) => check.description(),
            Self::Composite(c) => c.description.clone(),
        }
    }

    /// Direct children, empty for a leaf.
    pub fn children(&self) -> &[Precondition] {
        match self {
            Self::Leaf(_) => &[],
            Self::Composite(c) => &c.children,
        }
    }

    /// Every leaf check, depth-first, left to right.
    pub fn leaves(&self) -> Vec<&dyn Check> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'s>(&'s self, out: &mut Vec<&'s dyn Check>) {
        match self {
            Self::Leaf(check) => out.push(check.as_ref()),
            Self::Composite(c) => c.children.iter().for_each(|child| child.collect_leaves(out)),
        }
    }

    /// Find the first unfulfilled leaf, depth-first.
    ///
    /// Returns the leaf's name and unfulfilled message. Children after it are
    /// not evaluated.
    fn first_failure(&self, ctx: &CheckContext<'_>) -> Option<(&'static str, TranslatableMessage)> {
        match self {
            Self::Leaf(check) => {
                let outcome: Outcome = check.evaluate(ctx);
                outcome.err().map(|message| (check.name(), message))
            }
            Self::Composite(c) => c.children.iter().find_map(|child| child.first_failure(ctx)),
        }
    }

    /// Whether [`Precondition::assert_is_fulfilled`] would succeed. Never fails.
    pub fn is_fulfilled(&self, ctx: &CheckContext<'_>) -> bool {
        self.first_failure(ctx).is_none()
    }

    /// The fulfilled message, or the message of the first unfulfilled leaf.
    pub fn status_message(&self, ctx: &CheckContext<'_>) -> TranslatableMessage {
        match self.first_failure(ctx) {
            Some((_, message)) => message,
            None => self.fulfilled_message(),
        }
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        match self {
            Self::Leaf(check) => check.fulfilled_message(),
            Self::Composite(c) => c.fulfilled_message.clone(),
        }
    }

    /// Fail with [`Error::Precondition`] naming the first unfulfilled leaf.
    pub fn assert_is_fulfilled(&self, ctx: &CheckContext<'_>) -> Result<()> {
        match self.first_failure(ctx) {
            None => {
                tracing::debug!(precondition = self.name(), "Precondition fulfilled");
                Ok(())
            }
            Some((leaf, message)) => {
                tracing::warn!(
                    precondition = self.name(),
                    leaf,
                    reason = %message,
                    "Precondition not fulfilled"
                );
                Err(Error::precondition(leaf, message))
            }
        }
    }
}

impl fmt::Debug for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(check) => write!(f, "Leaf({})", check.name()),
            Self::Composite(c) => f
                .debug_struct("Composite")
                .field("name", &c.name)
                .field("children", &c.children)
                .finish(),
        }
    }
}
