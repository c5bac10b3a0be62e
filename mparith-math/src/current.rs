//! The current context
//!
//! Operations that are not handed a context explicitly use the current one.
//! The store runs in one of two modes:
//!
//! - [`ContextMode::ThreadLocal`] (the default): every thread lazily gets its
//!   own default context on first access. A one-entry cache keyed by thread id
//!   sits in front of the per-thread map.
//! - [`ContextMode::Global`]: one process-wide context shared by every thread.
//!
//! Scoped activation is provided by [`LocalContext`], whose guard reinstalls
//! the previously current context when it is dropped, whatever the exit path.

use std::cell::Cell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::context::Context;
use crate::error::NumResult;
use crate::options::ContextOptions;

/// Shared handle to a context
pub type ContextRef = Arc<Mutex<Context>>;

/// Wrap a context in a shared handle
pub fn shared(ctx: Context) -> ContextRef {
    Arc::new(Mutex::new(ctx))
}

/// How the current context is scoped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContextMode {
    /// Each thread has its own current context
    #[default]
    ThreadLocal,
    /// All threads share one current context
    Global,
}

struct ContextStore {
    mode: RwLock<ContextMode>,
    global: Mutex<Option<ContextRef>>,
    threads: RwLock<HashMap<ThreadId, ContextRef>>,
    cache: Mutex<Option<(ThreadId, ContextRef)>>,
}

impl ContextStore {
    fn new() -> Self {
        Self {
            mode: RwLock::new(ContextMode::default()),
            global: Mutex::new(None),
            threads: RwLock::new(HashMap::new()),
            cache: Mutex::new(None),
        }
    }

    fn current(&self) -> ContextRef {
        match *self.mode.read() {
            ContextMode::Global => self.global.lock().get_or_insert_with(|| shared(Context::new())).clone(),
            ContextMode::ThreadLocal => self.thread_current(thread::current().id()),
        }
    }

    fn thread_current(&self, id: ThreadId) -> ContextRef {
        if let Some((cached_id, ctx)) = self.cache.lock().as_ref() {
            if *cached_id == id {
                return ctx.clone();
            }
        }

        let existing = self.threads.read().get(&id).cloned();
        let ctx = match existing {
            Some(ctx) => ctx,
            None => {
                register_thread_slot();
                let ctx = shared(Context::new());
                self.threads.write().insert(id, ctx.clone());
                debug!("created default context for thread {:?}", id);
                ctx
            }
        };

        *self.cache.lock() = Some((id, ctx.clone()));
        ctx
    }

    fn install(&self, ctx: ContextRef) {
        match *self.mode.read() {
            ContextMode::Global => {
                *self.global.lock() = Some(ctx);
            }
            ContextMode::ThreadLocal => {
                let id = thread::current().id();
                register_thread_slot();
                self.threads.write().insert(id, ctx.clone());
                *self.cache.lock() = Some((id, ctx));
            }
        }
    }

    fn forget_thread(&self, id: ThreadId) {
        self.threads.write().remove(&id);
        let mut cache = self.cache.lock();
        if matches!(cache.as_ref(), Some((cached_id, _)) if *cached_id == id) {
            *cache = None;
        }
    }
}

static STORE: Lazy<ContextStore> = Lazy::new(ContextStore::new);

/// Removes a thread's context from the store when the thread exits
struct ThreadSlot(ThreadId);

impl Drop for ThreadSlot {
    fn drop(&mut self) {
        STORE.forget_thread(self.0);
    }
}

thread_local! {
    static THREAD_SLOT: Cell<Option<ThreadSlot>> = const { Cell::new(None) };
}

fn register_thread_slot() {
    let _ = THREAD_SLOT.try_with(|slot| {
        let current = slot.take();
        let registered = current.unwrap_or_else(|| ThreadSlot(thread::current().id()));
        slot.set(Some(registered));
    });
}

/// The scoping mode of the current context
pub fn context_mode() -> ContextMode {
    *STORE.mode.read()
}

/// Change the scoping mode of the current context
pub fn set_context_mode(mode: ContextMode) {
    let mut current = STORE.mode.write();
    if *current != mode {
        debug!("context mode changed from {:?} to {:?}", *current, mode);
        *current = mode;
    }
}

/// The current context
pub fn get_current() -> ContextRef {
    STORE.current()
}

/// Install a context as the current one
///
/// A read-only context is never installed directly; a private copy with
/// cleared flags is installed instead. Returns the handle that is now current.
pub fn set_current(ctx: ContextRef) -> ContextRef {
    let installed = {
        let guard = ctx.lock();
        if guard.is_read_only() {
            Some(shared(guard.copy()))
        } else {
            None
        }
    };
    let installed = installed.unwrap_or(ctx);
    debug!("installing current context");
    STORE.install(installed.clone());
    installed
}

/// Run a closure against the current context
///
/// The current context stays locked while `f` runs. Operations called from
/// inside the closure must be passed `Some(ctx)`; passing `None` would try to
/// lock the current context again and deadlock.
pub fn with_current<R>(f: impl FnOnce(&mut Context) -> R) -> R {
    let ctx = get_current();
    let mut guard = ctx.lock();
    f(&mut guard)
}

/// Resolve the context an operation runs against
///
/// An explicit context is used directly unless it is read-only, in which case
/// the operation runs against a private copy and its flags are discarded.
/// Without an explicit context the current one is used.
pub(crate) fn with_context<R>(
    ctx: Option<&mut Context>,
    f: impl FnOnce(&mut Context) -> NumResult<R>,
) -> NumResult<R> {
    match ctx {
        Some(ctx) if ctx.is_read_only() => {
            let mut scratch = ctx.copy();
            f(&mut scratch)
        }
        Some(ctx) => f(ctx),
        None => {
            let current = get_current();
            let mut guard = current.lock();
            with_context(Some(&mut *guard), f)
        }
    }
}

/// Builder for a scoped context activation
#[derive(Debug, Default)]
pub struct LocalContext {
    base: Option<ContextRef>,
    options: ContextOptions,
}

impl LocalContext {
    /// Activate a copy of the current context
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the given context
    ///
    /// A read-only base is copied with its flags reset. Any other base is
    /// activated as-is and the overrides are applied to it.
    pub fn from_context(base: ContextRef) -> Self {
        Self {
            base: Some(base),
            options: ContextOptions::default(),
        }
    }

    /// Option overrides applied to the activated context
    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    /// Install the context and return the guard that restores the previous one
    pub fn enter(self) -> NumResult<ContextGuard> {
        let previous = get_current();

        let active = match self.base {
            Some(base) => {
                let copy = {
                    let guard = base.lock();
                    if guard.is_read_only() {
                        Some(guard.copy())
                    } else {
                        None
                    }
                };
                match copy {
                    Some(mut ctx) => {
                        ctx.configure(&self.options)?;
                        shared(ctx)
                    }
                    None => {
                        if !self.options.is_empty() {
                            base.lock().configure(&self.options)?;
                        }
                        base
                    }
                }
            }
            None => {
                let mut ctx = previous.lock().copy();
                ctx.configure(&self.options)?;
                shared(ctx)
            }
        };

        debug!("entering local context");
        STORE.install(active.clone());
        Ok(ContextGuard {
            previous,
            active,
            _not_send: PhantomData,
        })
    }
}

/// Restores the previously current context when dropped
#[must_use = "the local context is deactivated as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: ContextRef,
    active: ContextRef,
    // restoration must happen on the thread that entered
    _not_send: PhantomData<*const ()>,
}

impl ContextGuard {
    /// The context active inside the scope
    ///
    /// This is also the current context, so do not call operations with
    /// `None` while holding its lock.
    pub fn context(&self) -> &ContextRef {
        &self.active
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        debug!("leaving local context");
        STORE.install(self.previous.clone());
    }
}

/// Activate a copy of the current context with overrides applied
pub fn local_context(options: ContextOptions) -> NumResult<ContextGuard> {
    LocalContext::new().with_options(options).enter()
}

/// Run a closure with a copy of the current context activated
///
/// The previous context is reinstated before this returns, including when
/// the closure fails or panics.
pub fn with_local_context<R>(
    options: ContextOptions,
    f: impl FnOnce(&ContextRef) -> NumResult<R>,
) -> NumResult<R> {
    let guard = local_context(options)?;
    f(guard.context())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_thread_gets_default_context() {
        let here = get_current();
        here.lock().set_precision(200).unwrap();

        let other = thread::spawn(|| get_current().lock().precision()).join().unwrap();
        assert_eq!(other, 53);
        assert_eq!(get_current().lock().precision(), 200);

        set_current(shared(Context::new()));
    }

    #[test]
    fn test_set_current_copies_read_only() {
        let mut ctx = Context::ieee(32).unwrap();
        ctx.set_flag(crate::Flags::INEXACT, true).unwrap();
        let template = shared(ctx.into_template());

        let installed = set_current(template.clone());
        assert!(!Arc::ptr_eq(&installed, &template));
        assert!(!installed.lock().is_read_only());
        assert!(!installed.lock().inexact());
        assert_eq!(installed.lock().precision(), 24);
        assert!(Arc::ptr_eq(&installed, &get_current()));

        set_current(shared(Context::new()));
    }

    #[test]
    fn test_with_current_hands_out_the_locked_context() {
        let _scope = local_context(ContextOptions::new().with_precision(30)).unwrap();
        let third = with_current(|ctx| crate::arith::div(1, 3, Some(ctx))).unwrap();
        assert_eq!(third.as_real().map(|r| r.prec()), Some(30));
        assert!(get_current().lock().inexact());
    }

    #[test]
    fn test_guard_restores_previous() {
        let before = get_current();
        let snapshot = before.lock().clone();
        {
            let guard = local_context(ContextOptions::new().with_precision(300)).unwrap();
            assert_eq!(get_current().lock().precision(), 300);
            assert!(Arc::ptr_eq(guard.context(), &get_current()));
        }
        assert!(Arc::ptr_eq(&before, &get_current()));
        assert_eq!(*get_current().lock(), snapshot);
    }

    #[test]
    fn test_invalid_override_leaves_current_untouched() {
        let before = get_current();
        let result = local_context(ContextOptions::new().with_precision(0));
        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &get_current()));
    }

    #[test]
    fn test_shared_base_is_activated_in_place() {
        let base = shared(Context::new());
        {
            let guard = LocalContext::from_context(base.clone())
                .with_options(ContextOptions::new().with_precision(90))
                .enter()
                .unwrap();
            assert!(Arc::ptr_eq(guard.context(), &base));
        }
        assert_eq!(base.lock().precision(), 90);
    }
}
