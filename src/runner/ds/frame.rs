use std::ops::{Add, Sub};

use log::trace;

use crate::runner::ds::value::JsValue;

/// Offsets below `vp` of the frame header slots.
pub const CALLEE_OFFSET: usize = 3;
pub const THIS_OFFSET: usize = 2;
pub const RESULT_OFFSET: usize = 1;

/// Index of a slot on the call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackPtr(pub usize);

impl Add<usize> for StackPtr {
    type Output = StackPtr;

    fn add(self, rhs: usize) -> StackPtr {
        StackPtr(self.0 + rhs)
    }
}

impl Sub<usize> for StackPtr {
    type Output = StackPtr;

    fn sub(self, rhs: usize) -> StackPtr {
        StackPtr(self.0.saturating_sub(rhs))
    }
}

/// Location of one activation on the call stack.
///
/// ```text
///   fp                          vp
///   | arg0 .. argN | callee | this | result | locals ..
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CallFrame {
    pub argc: u32,
    pub fp: StackPtr,
    pub vp: StackPtr,
}

impl CallFrame {
    pub fn callee_ptr(&self) -> StackPtr {
        self.vp - CALLEE_OFFSET
    }

    pub fn this_ptr(&self) -> StackPtr {
        self.vp - THIS_OFFSET
    }

    pub fn result_ptr(&self) -> StackPtr {
        self.vp - RESULT_OFFSET
    }
}

/// The value stack shared by every activation.
#[derive(Default)]
pub struct CallStack {
    slots: Vec<JsValue>,
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            slots: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pointer to the slot the next push will fill.
    pub fn next(&self) -> StackPtr {
        StackPtr(self.slots.len())
    }

    pub fn push(&mut self, value: JsValue) {
        self.slots.push(value);
    }

    pub fn pop(&mut self) -> JsValue {
        self.slots.pop().unwrap_or_default()
    }

    /// Reserves `count` slots initialised to undefined.
    pub fn alloc(&mut self, count: usize) -> StackPtr {
        let start = self.next();
        self.slots
            .resize_with(self.slots.len() + count, JsValue::undefined);
        start
    }

    pub fn free(&mut self, count: usize) {
        let len = self.slots.len().saturating_sub(count);
        self.slots.truncate(len);
    }

    pub fn truncate(&mut self, size: usize) {
        self.slots.truncate(size);
    }

    pub fn get(&self, ptr: StackPtr) -> JsValue {
        self.slots.get(ptr.0).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, ptr: StackPtr, value: JsValue) {
        if let Some(slot) = self.slots.get_mut(ptr.0) {
            *slot = value;
        }
    }

    /// Copies `count` values starting at `ptr`.
    pub fn values(&self, ptr: StackPtr, count: usize) -> Vec<JsValue> {
        let end = (ptr.0 + count).min(self.slots.len());
        let start = ptr.0.min(end);
        self.slots[start..end].to_vec()
    }

    /// Builds a frame over the `argc` values already pushed. Missing formal
    /// parameters are padded with undefined.
    pub fn push_frame_excl_args(
        &mut self,
        argc: u32,
        param_count: u32,
        callee: JsValue,
        this: JsValue,
    ) -> CallFrame {
        let fp = StackPtr(self.slots.len().saturating_sub(argc as usize));
        for _ in argc..param_count {
            self.slots.push(JsValue::undefined());
        }
        self.slots.push(callee);
        self.slots.push(this);
        self.slots.push(JsValue::undefined());
        let frame = CallFrame {
            argc,
            fp,
            vp: self.next(),
        };
        trace!("push frame fp={} vp={} argc={}", fp.0, frame.vp.0, argc);
        self.frames.push(frame);
        frame
    }

    /// Pushes `args` and a frame over them.
    pub fn push_frame(
        &mut self,
        args: Vec<JsValue>,
        param_count: u32,
        callee: JsValue,
        this: JsValue,
    ) -> CallFrame {
        let argc = args.len() as u32;
        self.slots.extend(args);
        self.push_frame_excl_args(argc, param_count, callee, this)
    }

    /// Pops the frame and everything above its first argument.
    pub fn pop_frame(&mut self, frame: &CallFrame) -> JsValue {
        let result = self.get(frame.result_ptr());
        trace!("pop frame fp={}", frame.fp.0);
        if let Some(pos) = self.frames.iter().rposition(|f| f.fp == frame.fp) {
            self.frames.truncate(pos);
        }
        self.slots.truncate(frame.fp.0);
        result
    }

    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// The frame whose slots start at `fp`.
    pub fn frame_at(&self, fp: StackPtr, vp: StackPtr) -> Option<&CallFrame> {
        self.frames.iter().rev().find(|f| f.fp == fp && f.vp == vp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let mut stack = CallStack::new();
        stack.push(JsValue::number(1.0));
        let frame = stack.push_frame(
            vec![JsValue::number(10.0)],
            3,
            JsValue::str("callee"),
            JsValue::null(),
        );
        assert_eq!(frame.fp, StackPtr(1));
        assert_eq!(frame.argc, 1);
        assert_eq!(stack.get(frame.fp), JsValue::number(10.0));
        assert!(stack.get(frame.fp + 1).is_undefined());
        assert!(stack.get(frame.fp + 2).is_undefined());
        assert!(stack.get(frame.this_ptr()).is_null());
        assert!(stack.get(frame.result_ptr()).is_undefined());
        assert_eq!(frame.vp, StackPtr(7));

        stack.set(frame.result_ptr(), JsValue::number(5.0));
        let result = stack.pop_frame(&frame);
        assert_eq!(result, JsValue::number(5.0));
        assert_eq!(stack.size(), 1);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_alloc_and_free() {
        let mut stack = CallStack::new();
        let start = stack.alloc(4);
        assert_eq!(start, StackPtr(0));
        assert_eq!(stack.size(), 4);
        assert!(stack.get(start + 3).is_undefined());
        stack.free(2);
        assert_eq!(stack.size(), 2);
        assert!(stack.get(StackPtr(10)).is_undefined());
    }

    #[test]
    fn test_excess_arguments_are_kept() {
        let mut stack = CallStack::new();
        let args = vec![JsValue::number(1.0), JsValue::number(2.0), JsValue::number(3.0)];
        let frame = stack.push_frame(args, 1, JsValue::undefined(), JsValue::undefined());
        assert_eq!(stack.values(frame.fp, frame.argc as usize).len(), 3);
        assert_eq!(frame.vp, StackPtr(6));
    }
}
