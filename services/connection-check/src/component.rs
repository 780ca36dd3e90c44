//! A small component host, shaped after Yew's `Component`.
//!
//! A component is created, rendered, and then initialized once through
//! `Component::mounted`. Asynchronous work is spawned on tokio with
//! `Scope::send_future`, and its result comes back as a message, which is
//! only delivered while the component is still mounted.
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use tracing_futures::Instrument;

use crate::html::Html;

pub trait Component: Sized + 'static {
    type Message: Send + 'static;
    type Properties;

    /// Builds the initial state. No side effect should happen here.
    fn create(ctx: &Context<Self>) -> Self;

    /// Called exactly once, after the first render.
    fn mounted(&mut self, _ctx: &Context<Self>) {}

    /// Applies a message, and returns `true` when the view must be rendered again.
    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool;

    fn view(&self) -> Html;
}

/// Handle used to send messages to a mounted component.
pub struct Scope<C: Component> {
    sender: mpsc::UnboundedSender<C::Message>,
    alive: Arc<AtomicBool>,
}

impl<C: Component> Clone for Scope<C> {
    fn clone(&self) -> Self {
        Scope {
            sender: self.sender.clone(),
            alive: Arc::clone(&self.alive),
        }
    }
}

impl<C: Component> Scope<C> {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Queues a message for the component. Messages sent after the component
    /// was unmounted are dropped.
    pub fn send_message(&self, msg: C::Message) {
        if !self.is_alive() || self.sender.send(msg).is_err() {
            debug!(
                component = std::any::type_name::<C>(),
                "Dropping message for unmounted component"
            );
        }
    }

    /// Spawns `future` and sends its output to the component once it resolves.
    ///
    /// Must be called from within a tokio runtime.
    pub fn send_future<F>(&self, future: F)
    where
        F: Future<Output = C::Message> + Send + 'static,
    {
        let scope = self.clone();
        tokio::spawn(
            async move {
                let msg = future.await;
                scope.send_message(msg);
            }
            .in_current_span(),
        );
    }
}

pub struct Context<C: Component> {
    scope: Scope<C>,
    props: C::Properties,
}

impl<C: Component> Context<C> {
    pub fn link(&self) -> &Scope<C> {
        &self.scope
    }

    pub fn props(&self) -> &C::Properties {
        &self.props
    }
}

/// A component attached to the host, together with its last render.
pub struct Mounted<C: Component> {
    component: C,
    context: Context<C>,
    receiver: mpsc::UnboundedReceiver<C::Message>,
    html: Html,
    renders: usize,
}

impl<C: Component> Mounted<C> {
    /// Creates the component, renders it, and runs its `mounted` hook.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(props: C::Properties) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let context = Context {
            scope: Scope {
                sender,
                alive: Arc::new(AtomicBool::new(true)),
            },
            props,
        };
        let mut component = C::create(&context);
        let html = component.view();
        component.mounted(&context);
        Mounted {
            component,
            context,
            receiver,
            html,
            renders: 1,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Number of times the view was rendered since mount.
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn scope(&self) -> Scope<C> {
        self.context.scope.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.context.scope.is_alive()
    }

    /// Waits for the next message and applies it. Returns whether the view
    /// was rendered again, or `None` once unmounted.
    ///
    /// This waits for as long as no message is sent.
    pub async fn next(&mut self) -> Option<bool> {
        if !self.is_mounted() {
            return None;
        }
        let msg = self.receiver.recv().await?;
        Some(self.apply(msg))
    }

    /// Applies the next message if one is already queued.
    #[cfg(test)]
    fn try_next(&mut self) -> Option<bool> {
        if !self.is_mounted() {
            return None;
        }
        let msg = self.receiver.try_recv().ok()?;
        Some(self.apply(msg))
    }

    /// Detaches the component. Pending and future messages are discarded,
    /// the last render stays available.
    pub fn unmount(&mut self) {
        self.context.scope.alive.store(false, Ordering::Release);
        self.receiver.close();
    }

    fn apply(&mut self, msg: C::Message) -> bool {
        let rerender = self.component.update(&self.context, msg);
        if rerender {
            self.html = self.component.view();
            self.renders += 1;
        }
        rerender
    }
}

impl<C: Component> Drop for Mounted<C> {
    fn drop(&mut self) {
        self.unmount();
    }
}
