use std::fmt;

/// Access and property flags of a class, field or method (JVMS 4.1, 4.5, 4.6).
///
/// Several bits are shared between declaration kinds (`ACC_SYNCHRONIZED` and `ACC_SUPER`,
/// `ACC_BRIDGE` and `ACC_VOLATILE`, `ACC_VARARGS` and `ACC_TRANSIENT`); the predicates below
/// are named after their method meaning.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    pub const EMPTY: AccessFlags = AccessFlags(0);
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SYNCHRONIZED: u16 = 0x0020;
    pub const BRIDGE: u16 = 0x0040;
    pub const VARARGS: u16 = 0x0080;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const STRICT: u16 = 0x0800;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;

    /// Flags the Java language lets a programmer write on a method.
    pub const SOURCE_METHOD_MASK: u16 = Self::PUBLIC
        | Self::PROTECTED
        | Self::PRIVATE
        | Self::ABSTRACT
        | Self::STATIC
        | Self::FINAL
        | Self::SYNCHRONIZED
        | Self::NATIVE;

    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    pub const fn with(self, flag: u16) -> Self {
        Self(self.0 | flag)
    }

    pub const fn without(self, flag: u16) -> Self {
        Self(self.0 & !flag)
    }

    pub fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    /// Neither public, protected nor private.
    pub fn is_package_private(self) -> bool {
        self.0 & (Self::PUBLIC | Self::PROTECTED | Self::PRIVATE) == 0
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    pub fn is_bridge(self) -> bool {
        self.contains(Self::BRIDGE)
    }

    pub fn is_varargs(self) -> bool {
        self.contains(Self::VARARGS)
    }

    pub fn is_native(self) -> bool {
        self.contains(Self::NATIVE)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    pub fn is_annotation(self) -> bool {
        self.contains(Self::ANNOTATION)
    }

    pub fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    /// Renders the source-level method modifiers in canonical Java order.
    pub fn method_keywords(self) -> String {
        const ORDER: [(u16, &str); 8] = [
            (AccessFlags::PUBLIC, "public"),
            (AccessFlags::PROTECTED, "protected"),
            (AccessFlags::PRIVATE, "private"),
            (AccessFlags::ABSTRACT, "abstract"),
            (AccessFlags::STATIC, "static"),
            (AccessFlags::FINAL, "final"),
            (AccessFlags::SYNCHRONIZED, "synchronized"),
            (AccessFlags::NATIVE, "native"),
        ];
        ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| *keyword)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<u16> for AccessFlags {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessFlags(0x{:04x})", self.0)
    }
}
