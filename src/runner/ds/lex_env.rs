use crate::runner::ds::env_record::{DeclarativeEnvironmentRecord, EnvironmentRecordType};
use crate::runner::ds::heap::{self, HeapRef};
use std::cell::RefCell;
use std::rc::Rc;

pub type JsLexEnvironmentType = Rc<RefCell<LexEnvironment>>;

pub struct LexEnvironment {
    pub inner: EnvironmentRecordType,
    pub outer: Option<JsLexEnvironmentType>,
}

impl LexEnvironment {
    pub fn new_ref(inner: EnvironmentRecordType, outer: Option<JsLexEnvironmentType>) -> JsLexEnvironmentType {
        let env = Rc::new(RefCell::new(LexEnvironment { inner, outer }));
        heap::register_environment(&env);
        env
    }

    pub fn outer(&self) -> Option<JsLexEnvironmentType> {
        self.outer.clone()
    }

    pub(crate) fn trace(&self, out: &mut Vec<HeapRef>) {
        if let Some(outer) = &self.outer {
            out.push(HeapRef::environment(outer));
        }
        match &self.inner {
            EnvironmentRecordType::Declarative(d) => out.extend(d.values().filter_map(HeapRef::value)),
            EnvironmentRecordType::Object(o) => out.push(HeapRef::object(&o.binding_object)),
        }
    }

    /// Leaves an empty declarative record with no outer environment.
    pub(crate) fn sever(&mut self) -> (Option<JsLexEnvironmentType>, EnvironmentRecordType) {
        let empty = EnvironmentRecordType::Declarative(DeclarativeEnvironmentRecord::new());
        (self.outer.take(), std::mem::replace(&mut self.inner, empty))
    }
}
