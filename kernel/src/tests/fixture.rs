/*
 * Test Fixture
 *
 * In-memory stand-ins for the collaborators a `KernelContext` bundles, and a
 * `Harness` that owns a context plus shared handles to inspect what the
 * handlers did. User pointers are ordinary host pointers: the harness treats
 * everything at or above `USER_BASE` as user memory.
 */

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::string::{String, ToString};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::vec::Vec;

use log::LevelFilter;
use spin::Mutex;

use crate::arch::x86_64::interrupts;
use crate::config::Config;
use crate::context::KernelContext;
use crate::fs::{Attribute, DirectoryEntry, FileSystem, FsError, Lookup};
use crate::graphics::{
    LayerError, LayerId, LayerManager, PixelColor, Vector2D, Window, WindowSpec,
};
use crate::io::{Errno, File, FileRef, Whence};
use crate::scheduler::{Message, Task, TaskId, TaskManager};
use crate::syscall::Disposition;
use crate::syscall::abi::SyscallArgs;
use crate::syscall::dispatch_with;
use crate::syscall::numbers::NativeCall;
use crate::syscall::user_ptr::UserAccess;
use crate::utils::logger::{self, LogSink};
use crate::utils::timer::{Timer, TimerManager};

pub const USER_BASE: u64 = 0x1000;
pub const OS_STACK_POINTER: u64 = 0xffff_8000_0020_0000;
pub const DPAGING_START: u64 = 0x0000_4000_0000_0000;
pub const FILEMAP_START: u64 = 0x0000_7fff_ffff_f000;

pub fn test_config() -> Config {
    Config { user_base: USER_BASE, ..Config::DEFAULT }
}

pub fn ptr<T>(data: &[T]) -> u64 {
    data.as_ptr() as u64
}

pub fn mut_ptr<T>(data: &mut [T]) -> u64 {
    data.as_mut_ptr() as u64
}

// ---------------------------------------------------------------------------
// log capture
// ---------------------------------------------------------------------------

std::thread_local! {
    static LOG_LINES: RefCell<String> = const { RefCell::new(String::new()) };
}

struct CaptureSink;

impl LogSink for CaptureSink {
    fn write_str(&self, s: &str) {
        LOG_LINES.with(|lines| lines.borrow_mut().push_str(s));
    }
}

static CAPTURE: CaptureSink = CaptureSink;

/// Route the kernel logger into a per-thread buffer and clear it.
pub fn capture_logs() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = logger::init(&CAPTURE, LevelFilter::Trace);
    });
    LOG_LINES.with(|lines| lines.borrow_mut().clear());
}

/// Lines logged by this thread since `capture_logs`.
pub fn logged() -> Vec<String> {
    LOG_LINES.with(|lines| lines.borrow().lines().map(ToString::to_string).collect())
}

// ---------------------------------------------------------------------------
// files
// ---------------------------------------------------------------------------

/// Seekable in-memory file
#[derive(Default)]
pub struct MemFile {
    data: Mutex<Vec<u8>>,
    offset: AtomicU64,
}

impl MemFile {
    pub fn new(content: &[u8]) -> Arc<Self> {
        Arc::new(Self { data: Mutex::new(content.to_vec()), offset: AtomicU64::new(0) })
    }

    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl File for MemFile {
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno> {
        let data = self.data.lock();
        let off = (self.offset.load(Ordering::SeqCst) as usize).min(data.len());
        let n = buf.len().min(data.len() - off);
        buf[..n].copy_from_slice(&data[off..off + n]);
        self.offset.store((off + n) as u64, Ordering::SeqCst);
        Ok(n)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
        let mut data = self.data.lock();
        let off = self.offset.load(Ordering::SeqCst) as usize;
        if data.len() < off + buf.len() {
            data.resize(off + buf.len(), 0);
        }
        data[off..off + buf.len()].copy_from_slice(buf);
        self.offset.store((off + buf.len()) as u64, Ordering::SeqCst);
        Ok(buf.len())
    }

    fn seek(&self, offset: i64, whence: Whence) -> Result<u64, Errno> {
        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => self.offset.load(Ordering::SeqCst) as i64,
            Whence::End => self.data.lock().len() as i64,
        };
        let new = base.checked_add(offset).filter(|o| *o >= 0).ok_or(Errno::EINVAL)?;
        self.offset.store(new as u64, Ordering::SeqCst);
        Ok(new as u64)
    }

    fn size(&self) -> u64 {
        self.data.lock().len() as u64
    }
}

/// Console stand-in: scripted input, captured output
#[derive(Default)]
pub struct Terminal {
    output: Mutex<Vec<u8>>,
    input: Mutex<VecDeque<u8>>,
    /// Set when an operation ran with interrupts masked.
    pub touched_masked: AtomicBool,
}

impl Terminal {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output.lock()).into_owned()
    }

    pub fn feed(&self, text: &str) {
        self.input.lock().extend(text.bytes());
    }

    fn note_mask(&self) {
        if !interrupts::are_enabled() {
            self.touched_masked.store(true, Ordering::SeqCst);
        }
    }
}

impl File for Terminal {
    /// Returns at most one line.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno> {
        self.note_mask();
        let mut input = self.input.lock();
        let mut n = 0;
        while n < buf.len() {
            let Some(byte) = input.pop_front() else { break };
            buf[n] = byte;
            n += 1;
            if byte == b'\n' {
                break;
            }
        }
        Ok(n)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
        self.note_mask();
        self.output.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn size(&self) -> u64 {
        0
    }

    fn is_terminal(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// file system
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FsState {
    entries: BTreeMap<String, DirectoryEntry>,
    files: BTreeMap<u64, Arc<MemFile>>,
    next_cluster: u64,
    lookups: usize,
    full: bool,
}

/// Flat in-memory file system; paths are relative to the root
#[derive(Clone, Default)]
pub struct MemFs {
    state: Arc<Mutex<FsState>>,
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

impl MemFs {
    pub fn add_dir(&self, path: &str) {
        let mut st = self.state.lock();
        st.next_cluster += 1;
        let entry = DirectoryEntry { cluster: st.next_cluster, attr: Attribute::DIRECTORY, size: 0 };
        st.entries.insert(normalize(path).to_string(), entry);
    }

    pub fn add_file(&self, path: &str, content: &[u8]) -> Arc<MemFile> {
        let mut st = self.state.lock();
        st.next_cluster += 1;
        let cluster = st.next_cluster;
        let entry = DirectoryEntry { cluster, attr: Attribute::ARCHIVE, size: content.len() as u64 };
        let file = MemFile::new(content);
        st.entries.insert(normalize(path).to_string(), entry);
        st.files.insert(cluster, file.clone());
        file
    }

    pub fn file(&self, path: &str) -> Option<Arc<MemFile>> {
        let st = self.state.lock();
        let entry = st.entries.get(normalize(path))?;
        st.files.get(&entry.cluster).cloned()
    }

    /// Number of `find_file` calls served so far.
    pub fn lookups(&self) -> usize {
        self.state.lock().lookups
    }

    /// Make every later `create_file` fail for lack of space.
    pub fn fill_up(&self) {
        self.state.lock().full = true;
    }
}

impl FileSystem for MemFs {
    fn find_file(&self, path: &str) -> Lookup {
        let mut st = self.state.lock();
        st.lookups += 1;
        let path = normalize(path);

        // a regular file followed by more path
        for (i, _) in path.match_indices('/') {
            if let Some(entry) = st.entries.get(&path[..i]) {
                if !entry.is_directory() {
                    return Lookup { entry: Some(*entry), post_slash: true };
                }
            }
        }
        let entry = st.entries.get(path.trim_end_matches('/')).copied();
        Lookup { entry, post_slash: entry.is_some() && path.ends_with('/') }
    }

    fn create_file(&self, path: &str) -> Result<DirectoryEntry, FsError> {
        let path = normalize(path);
        if path.is_empty() || path.ends_with('/') {
            return Err(FsError::IsDirectory);
        }
        {
            let st = self.state.lock();
            if let Some((parent, _)) = path.rsplit_once('/') {
                match st.entries.get(parent) {
                    Some(entry) if entry.is_directory() => {}
                    _ => return Err(FsError::NoSuchEntry),
                }
            }
            if st.full {
                return Err(FsError::NoEnoughMemory);
            }
        }
        self.add_file(path, b"");
        let st = self.state.lock();
        st.entries.get(path).copied().ok_or(FsError::Io)
    }

    fn open(&self, entry: &DirectoryEntry) -> FileRef {
        let st = self.state.lock();
        match st.files.get(&entry.cluster) {
            Some(file) => file.clone(),
            None => MemFile::new(b""),
        }
    }
}

// ---------------------------------------------------------------------------
// tasks
// ---------------------------------------------------------------------------

struct MockTasks {
    task: Task,
    wakeups: VecDeque<Message>,
    sleeps: Arc<AtomicUsize>,
}

impl TaskManager for MockTasks {
    fn current_task(&mut self) -> &mut Task {
        &mut self.task
    }

    /// Deliver the next scripted message, as if it arrived while asleep.
    fn sleep_current(&mut self) {
        assert!(!interrupts::are_enabled(), "sleep outside a critical section");
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        match self.wakeups.pop_front() {
            Some(msg) => self.task.send_message(msg),
            None => panic!("task would sleep forever"),
        }
    }
}

// ---------------------------------------------------------------------------
// compositor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Pixel(Vector2D, PixelColor),
    Text(Vector2D, String, PixelColor),
    Rect(Vector2D, Vector2D, PixelColor),
}

pub struct MockWindow {
    size: Vector2D,
    ops: Mutex<Vec<DrawOp>>,
    pub drawn_masked: AtomicBool,
}

impl MockWindow {
    pub fn new(size: Vector2D) -> Self {
        Self { size, ops: Mutex::default(), drawn_masked: AtomicBool::new(false) }
    }

    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.lock().clone()
    }

    fn record(&self, op: DrawOp) {
        if !interrupts::are_enabled() {
            self.drawn_masked.store(true, Ordering::SeqCst);
        }
        self.ops.lock().push(op);
    }
}

impl Window for MockWindow {
    fn size(&self) -> Vector2D {
        self.size
    }

    fn write_pixel(&self, pos: Vector2D, color: PixelColor) {
        self.record(DrawOp::Pixel(pos, color));
    }

    fn write_string(&self, pos: Vector2D, text: &str, color: PixelColor) {
        self.record(DrawOp::Text(pos, text.to_string(), color));
    }

    fn fill_rectangle(&self, pos: Vector2D, size: Vector2D, color: PixelColor) {
        self.record(DrawOp::Rect(pos, size, color));
    }
}

/// Everything the mock compositor was asked to do
#[derive(Default)]
pub struct LayerLog {
    pub windows: BTreeMap<LayerId, (WindowSpec, Vector2D, Arc<MockWindow>)>,
    pub activated: Vec<LayerId>,
    pub owners: BTreeMap<LayerId, TaskId>,
    pub draws: Vec<LayerId>,
    pub closed: Vec<LayerId>,
}

impl LayerLog {
    pub fn window(&self, id: LayerId) -> Arc<MockWindow> {
        self.windows[&id].2.clone()
    }
}

struct MockLayers {
    log: Arc<Mutex<LayerLog>>,
    next_id: u32,
}

impl LayerManager for MockLayers {
    fn new_toplevel(&mut self, spec: WindowSpec, position: Vector2D) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        let window = Arc::new(MockWindow::new(Vector2D::new(spec.width, spec.height)));
        self.log.lock().windows.insert(id, (spec, position, window));
        id
    }

    fn activate(&mut self, id: LayerId) {
        self.log.lock().activated.push(id);
    }

    fn bind_task(&mut self, id: LayerId, task: TaskId) {
        self.log.lock().owners.insert(id, task);
    }

    fn find_window(&self, id: LayerId) -> Option<Arc<dyn Window>> {
        let log = self.log.lock();
        let (_, _, window) = log.windows.get(&id)?;
        Some(window.clone() as Arc<dyn Window>)
    }

    fn draw(&mut self, id: LayerId) {
        self.log.lock().draws.push(id);
    }

    fn close_layer(&mut self, id: LayerId) -> Result<(), LayerError> {
        let mut log = self.log.lock();
        log.windows.remove(&id).ok_or(LayerError::NoSuchLayer)?;
        log.owners.remove(&id);
        log.closed.push(id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// timers
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TimerLog {
    pub tick: u64,
    pub timers: Vec<Timer>,
}

struct MockTimers(Arc<Mutex<TimerLog>>);

impl TimerManager for MockTimers {
    fn current_tick(&self) -> u64 {
        self.0.lock().tick
    }

    fn add_timer(&mut self, timer: Timer) {
        self.0.lock().timers.push(timer);
    }
}

// ---------------------------------------------------------------------------
// harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub ctx: KernelContext,
    pub user: UserAccess,
    pub terminal: Arc<Terminal>,
    pub fs: MemFs,
    pub layers: Arc<Mutex<LayerLog>>,
    pub timers: Arc<Mutex<TimerLog>>,
    pub sleeps: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(test_config(), Vec::new())
    }

    /// A harness whose task receives `wakeups` one per sleep.
    pub fn with_wakeups(wakeups: Vec<Message>) -> Self {
        Self::build(test_config(), wakeups)
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, Vec::new())
    }

    fn build(config: Config, wakeups: Vec<Message>) -> Self {
        let terminal = Arc::new(Terminal::default());
        let mut task = Task::new(TaskId(1));
        for _ in 0..3 {
            task.files_mut().open(terminal.clone());
        }
        task.set_os_stack_pointer(OS_STACK_POINTER);
        task.set_dpaging_end(DPAGING_START);
        task.set_filemap_end(FILEMAP_START);

        let sleeps = Arc::new(AtomicUsize::new(0));
        let layers = Arc::new(Mutex::new(LayerLog::default()));
        let timers = Arc::new(Mutex::new(TimerLog::default()));
        let fs = MemFs::default();

        let ctx = KernelContext::new(
            config,
            Box::new(MockTasks { task, wakeups: wakeups.into(), sleeps: sleeps.clone() }),
            Box::new(MockLayers { log: layers.clone(), next_id: 0 }),
            Box::new(MockTimers(timers.clone())),
            Box::new(fs.clone()),
        );

        Self {
            ctx,
            user: unsafe { UserAccess::new(USER_BASE) },
            terminal,
            fs,
            layers,
            timers,
            sleeps,
        }
    }

    pub fn call(&self, number: u64, args: [u64; 6]) -> Disposition {
        let disposition = dispatch_with(&self.ctx, &self.user, number, SyscallArgs(args));
        assert!(interrupts::are_enabled(), "syscall {number:#x} left interrupts masked");
        disposition
    }

    /// Run a native call that is expected to return normally.
    pub fn native(&self, call: NativeCall, args: [u64; 6]) -> (u64, i32) {
        match self.call(call.number(), args) {
            Disposition::Return { value, error } => (value, error),
            other => panic!("{call:?} did not return: {other:?}"),
        }
    }

    /// Run a compatibility call that is expected to return normally.
    pub fn compat(&self, number: u64, args: [u64; 6]) -> (i64, i32) {
        match self.call(number, args) {
            Disposition::Return { value, error } => (value as i64, error),
            other => panic!("syscall {number:#x} did not return: {other:?}"),
        }
    }

    pub fn task<R>(&self, f: impl FnOnce(&mut Task) -> R) -> R {
        self.ctx.with_current_task(f)
    }

    pub fn send(&self, msg: Message) {
        self.task(|task| task.send_message(msg));
    }

    pub fn install(&self, file: FileRef) -> usize {
        self.task(|task| task.files_mut().open(file))
    }

    pub fn fd_count(&self) -> usize {
        self.task(|task| task.files().len())
    }

    pub fn sleeps(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }
}

/// Native error codes as the `error` register carries them
pub fn errno(e: Errno) -> i32 {
    e.code()
}
