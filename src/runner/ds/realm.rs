use log::debug;

use crate::runner::ds::error::ErrorKind;
use crate::runner::ds::function_object::{
    empty_function, throw_type_error, FunctionCode, FunctionData,
};
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::operations::lex_env::new_object_environment;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::NativeFn;

/// Objects the runtime itself needs to reach, independent of what user code
/// does to the global object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownIntrinsics {
    ObjectPrototype,
    FunctionPrototype,
    ArrayPrototype,
    StringPrototype,
    BooleanPrototype,
    NumberPrototype,
    DatePrototype,
    RegExpPrototype,
    ErrorPrototype,
    EvalErrorPrototype,
    RangeErrorPrototype,
    ReferenceErrorPrototype,
    SyntaxErrorPrototype,
    TypeErrorPrototype,
    URIErrorPrototype,
    ThrowTypeError,
}

impl WellKnownIntrinsics {
    pub const ALL: [WellKnownIntrinsics; 16] = [
        WellKnownIntrinsics::ObjectPrototype,
        WellKnownIntrinsics::FunctionPrototype,
        WellKnownIntrinsics::ArrayPrototype,
        WellKnownIntrinsics::StringPrototype,
        WellKnownIntrinsics::BooleanPrototype,
        WellKnownIntrinsics::NumberPrototype,
        WellKnownIntrinsics::DatePrototype,
        WellKnownIntrinsics::RegExpPrototype,
        WellKnownIntrinsics::ErrorPrototype,
        WellKnownIntrinsics::EvalErrorPrototype,
        WellKnownIntrinsics::RangeErrorPrototype,
        WellKnownIntrinsics::ReferenceErrorPrototype,
        WellKnownIntrinsics::SyntaxErrorPrototype,
        WellKnownIntrinsics::TypeErrorPrototype,
        WellKnownIntrinsics::URIErrorPrototype,
        WellKnownIntrinsics::ThrowTypeError,
    ];

    pub fn error_prototype(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Error => WellKnownIntrinsics::ErrorPrototype,
            ErrorKind::EvalError => WellKnownIntrinsics::EvalErrorPrototype,
            ErrorKind::RangeError => WellKnownIntrinsics::RangeErrorPrototype,
            ErrorKind::ReferenceError => WellKnownIntrinsics::ReferenceErrorPrototype,
            ErrorKind::SyntaxError => WellKnownIntrinsics::SyntaxErrorPrototype,
            ErrorKind::TypeError => WellKnownIntrinsics::TypeErrorPrototype,
            ErrorKind::URIError => WellKnownIntrinsics::URIErrorPrototype,
        }
    }
}

fn native_skeleton(prototype: &JsObjectType, call: NativeFn) -> JsObject {
    JsObject::new(
        "Function",
        Some(prototype.clone()),
        ObjectKind::Function(FunctionData {
            code: FunctionCode::Native {
                call,
                construct: None,
            },
            strict: false,
            name: JsString::empty(),
        }),
    )
}

/// The intrinsic objects, the global object and the global environment.
///
/// `new` only allocates skeletons and wires their prototype links; the
/// built-in library populates them afterwards, so that cyclic references
/// such as `Function.prototype.__proto__ === Object.prototype` exist before
/// any method is installed.
pub struct CodeRealm {
    intrinsics: Vec<JsObjectType>,
    pub global_this: JsObjectType,
    pub global_env: JsLexEnvironmentType,
}

impl CodeRealm {
    pub fn new() -> Self {
        let object_prototype = JsObject::ordinary(None).into_ref();
        let proto = || Some(object_prototype.clone());

        let mut function_prototype = native_skeleton(&object_prototype, empty_function);
        function_prototype.define_value("length", JsValue::from(0u32), false, false, false);
        let function_prototype = function_prototype.into_ref();

        let mut array_prototype = JsObject::new("Array", proto(), ObjectKind::Array);
        array_prototype.define_value("length", JsValue::from(0u32), true, false, false);

        let mut string_prototype =
            JsObject::new("String", proto(), ObjectKind::String(JsString::empty()));
        string_prototype.define_value("length", JsValue::from(0u32), false, false, false);

        let boolean_prototype = JsObject::new("Boolean", proto(), ObjectKind::Boolean(false));
        let number_prototype = JsObject::new("Number", proto(), ObjectKind::Number(0.0));
        let date_prototype = JsObject::new("Date", proto(), ObjectKind::Date(f64::NAN));
        let regexp_prototype = JsObject::ordinary(proto());
        let error_prototype = JsObject::new("Error", proto(), ObjectKind::Error).into_ref();
        let native_error = || {
            JsObject::new("Error", Some(error_prototype.clone()), ObjectKind::Error).into_ref()
        };

        let mut thrower = native_skeleton(&function_prototype, throw_type_error);
        thrower.define_value("length", JsValue::from(0u32), false, false, false);
        thrower.extensible = false;

        let intrinsics = vec![
            object_prototype.clone(),
            function_prototype,
            array_prototype.into_ref(),
            string_prototype.into_ref(),
            boolean_prototype.into_ref(),
            number_prototype.into_ref(),
            date_prototype.into_ref(),
            regexp_prototype.into_ref(),
            error_prototype.clone(),
            native_error(),
            native_error(),
            native_error(),
            native_error(),
            native_error(),
            native_error(),
            thrower.into_ref(),
        ];
        debug_assert_eq!(intrinsics.len(), WellKnownIntrinsics::ALL.len());

        let global_this = JsObject::new("global", proto(), ObjectKind::Ordinary).into_ref();
        let global_env = new_object_environment(global_this.clone(), false, None);
        debug!("realm skeleton created with {} intrinsics", intrinsics.len());
        CodeRealm {
            intrinsics,
            global_this,
            global_env,
        }
    }

    pub fn intrinsic(&self, which: WellKnownIntrinsics) -> JsObjectType {
        self.intrinsics[which as usize].clone()
    }
}

impl Default for CodeRealm {
    fn default() -> Self {
        Self::new()
    }
}
