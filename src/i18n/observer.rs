//! Explicit subscription that keeps dynamically inserted content translated.

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::document::{Mutation, Observable};
use crate::i18n::binder::is_declaration_attribute;
use crate::i18n::loader::DictionarySource;
use crate::i18n::translator::Translator;
use crate::preferences::PreferenceStore;

/// What: Dynamic-content subscription created by `Translator::observe_dynamic_content`.
///
/// Details:
/// - Re-applies bindings only to inserted elements and to elements whose
///   declaration attributes changed, so the cost follows the mutation, not the page.
/// - Dropping the observer ends the subscription.
pub struct Observer<'t, S, P, D: Observable> {
    translator: &'t Translator<S, P>,
    mutations: UnboundedReceiver<Mutation<D::Node>>,
}

impl<'t, S: DictionarySource, P: PreferenceStore, D: Observable> Observer<'t, S, P, D> {
    pub(crate) const fn new(
        translator: &'t Translator<S, P>,
        mutations: UnboundedReceiver<Mutation<D::Node>>,
    ) -> Self {
        Self {
            translator,
            mutations,
        }
    }

    /// What: Elements affected by a mutation, if it matters for translation.
    fn affected(mutation: Mutation<D::Node>) -> Option<D::Node> {
        match mutation {
            Mutation::Inserted(node) => Some(node),
            Mutation::AttributeChanged { node, name } => {
                is_declaration_attribute(&name).then_some(node)
            }
        }
    }

    fn apply_scopes(
        &self,
        doc: &mut D,
        first: Option<Mutation<D::Node>>,
        rest: Vec<Mutation<D::Node>>,
    ) -> usize {
        let mut scopes: Vec<D::Node> = Vec::new();
        for mutation in first.into_iter().chain(rest) {
            if let Some(node) = Self::affected(mutation)
                && !scopes.contains(&node)
            {
                scopes.push(node);
            }
        }
        for scope in &scopes {
            self.translator.apply_bindings(doc, *scope);
        }
        if !scopes.is_empty() {
            tracing::debug!(scopes = scopes.len(), "Re-applied bindings to dynamic content");
        }
        scopes.len()
    }

    fn drain(&mut self) -> Vec<Mutation<D::Node>> {
        let mut pending = Vec::new();
        while let Ok(mutation) = self.mutations.try_recv() {
            pending.push(mutation);
        }
        pending
    }

    /// What: Handle every mutation reported so far.
    ///
    /// Output:
    /// - Number of element scopes re-applied
    pub fn process_pending(&mut self, doc: &mut D) -> usize {
        let pending = self.drain();
        self.apply_scopes(doc, None, pending)
    }

    /// What: Wait for the next batch of mutations and handle it.
    ///
    /// Output:
    /// - `Some(scopes re-applied)`, or `None` once the document side of the feed is gone
    ///
    /// Details:
    /// - The document lock is taken only after a mutation has arrived.
    pub async fn next_batch(&mut self, doc: &Mutex<D>) -> Option<usize> {
        let first = self.mutations.recv().await?;
        let mut guard = doc.lock().await;
        let rest = self.drain();
        Some(self.apply_scopes(&mut guard, Some(first), rest))
    }
}
