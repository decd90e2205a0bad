#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Sqrt,
    Sin,
    Cos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortCircuitOperator {
    And,
    Or,
}

/// Entity accessor. `X`, `Y` and `Radius` answer for any live entity, the
/// rest require a worm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityProperty {
    X,
    Y,
    Radius,
    Direction,
    ActionPoints,
    MaxActionPoints,
    HitPoints,
    MaxHitPoints,
}

impl EntityProperty {
    pub fn name(&self) -> &'static str {
        match self {
            EntityProperty::X => "x",
            EntityProperty::Y => "y",
            EntityProperty::Radius => "radius",
            EntityProperty::Direction => "direction",
            EntityProperty::ActionPoints => "actionPoints",
            EntityProperty::MaxActionPoints => "maxActionPoints",
            EntityProperty::HitPoints => "hitPoints",
            EntityProperty::MaxHitPoints => "maxHitPoints",
        }
    }

    pub fn needs_worm(&self) -> bool {
        !matches!(
            self,
            EntityProperty::X | EntityProperty::Y | EntityProperty::Radius
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPredicate {
    IsWorm,
    IsFood,
}
